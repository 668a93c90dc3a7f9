//! Ordered decision tables.
//!
//! Every classifier in the workspace is written as a slice of [`Rule`]s scanned
//! top to bottom; the first rule whose predicate holds decides the outcome. Row
//! order is the tie-break, so tables must never be re-sorted.
//!
//! Classifiers that must always produce an outcome use a [`DecisionTable`], whose
//! catch-all lives in `otherwise` rather than in a trailing row.

/// One row of a decision table: a named predicate over a fact set `F` and the
/// outcome `O` it yields.
pub struct Rule<F, O> {
    pub name: &'static str,
    pub when: fn(&F) -> bool,
    pub then: O,
}

/// Predicate for a catch-all final row.
pub fn always<F>(_: &F) -> bool {
    true
}

/// First rule whose predicate holds, if any.
pub fn first_match<'a, F, O>(rules: &'a [Rule<F, O>], facts: &F) -> Option<&'a Rule<F, O>> {
    rules.iter().find(|rule| (rule.when)(facts))
}

/// Every rule whose predicate holds, in table order.
pub fn all_matches<'a, 'f, F, O>(
    rules: &'a [Rule<F, O>],
    facts: &'f F,
) -> impl Iterator<Item = &'a Rule<F, O>> + 'f
where
    'a: 'f,
{
    rules.iter().filter(move |rule| (rule.when)(facts))
}

/// Ordered rows plus the outcome used when none of them holds.
pub struct DecisionTable<F: 'static, O: 'static> {
    pub rows: &'static [Rule<F, O>],
    pub otherwise_name: &'static str,
    pub otherwise: O,
}

impl<F: 'static, O: 'static> DecisionTable<F, O> {
    /// Name and outcome of the first holding row, else of the catch-all.
    pub fn decide(&self, facts: &F) -> (&'static str, &O) {
        match first_match(self.rows, facts) {
            Some(rule) => (rule.name, &rule.then),
            None => (self.otherwise_name, &self.otherwise),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Facts {
        value: i32,
    }

    #[rustfmt::skip]
    const TABLE: &[Rule<Facts, &str>] = &[
        Rule { name: "big", when: |f| f.value > 10, then: "big" },
        Rule { name: "positive", when: |f| f.value > 0, then: "positive" },
        Rule { name: "else", when: always, then: "other" },
    ];

    #[test]
    fn test_first_match_respects_row_order() {
        let hit = first_match(TABLE, &Facts { value: 50 }).unwrap();
        assert_eq!(hit.name, "big");

        let hit = first_match(TABLE, &Facts { value: 3 }).unwrap();
        assert_eq!(hit.then, "positive");

        let hit = first_match(TABLE, &Facts { value: -3 }).unwrap();
        assert_eq!(hit.name, "else");
    }

    #[rustfmt::skip]
    static SIGNED: DecisionTable<Facts, &str> = DecisionTable {
        rows: &[
            Rule { name: "positive", when: |f| f.value > 0, then: "up" },
            Rule { name: "negative", when: |f| f.value < 0, then: "down" },
        ],
        otherwise_name: "zero",
        otherwise: "flat",
    };

    #[test]
    fn test_decision_table_falls_back_to_otherwise() {
        assert_eq!(SIGNED.decide(&Facts { value: 4 }), ("positive", &"up"));
        assert_eq!(SIGNED.decide(&Facts { value: -4 }), ("negative", &"down"));
        assert_eq!(SIGNED.decide(&Facts { value: 0 }), ("zero", &"flat"));
    }

    #[test]
    fn test_first_match_empty_table() {
        let empty: &[Rule<Facts, &str>] = &[];
        assert!(first_match(empty, &Facts { value: 1 }).is_none());
    }

    #[test]
    fn test_all_matches_keeps_order() {
        let names: Vec<&str> = all_matches(TABLE, &Facts { value: 50 })
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["big", "positive", "else"]);
    }
}
