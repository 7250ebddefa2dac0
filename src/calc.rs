use crate::catalog::{Person, PoolQuestion, Role};
use std::collections::HashMap;

/// Resolves the weight to apply to a question's score for an evaluated
/// person. Override precedence: job title, then position label, then role;
/// the default weight covers everything else. Total over its input domain.
pub fn question_weight(question: &PoolQuestion, person: Option<&Person>) -> f64 {
    let Some(person) = person else {
        return question.default_weight;
    };
    if let Some(by_title) = &question.weight_by_title {
        if let Some(w) = by_title.get(&person.title) {
            return *w;
        }
        if let Some(position) = &person.position {
            if let Some(w) = by_title.get(position) {
                return *w;
            }
        }
    }
    if let Some(by_role) = &question.weight_by_role {
        if let Some(w) = by_role.get(&person.role) {
            return *w;
        }
    }
    question.default_weight
}

/// How much an (evaluator role, evaluated role) relationship counts.
/// A missing pair falls back to the neutral 1.0 instead of failing.
#[derive(Debug, Clone)]
pub struct RoleMultipliers {
    table: HashMap<(Role, Role), f64>,
}

impl RoleMultipliers {
    pub fn standard() -> RoleMultipliers {
        let table = HashMap::from([
            ((Role::Manager, Role::Manager), 1.0),
            ((Role::Manager, Role::Chief), 0.9),
            ((Role::Manager, Role::Staff), 1.0),
            ((Role::Chief, Role::Manager), 0.7),
            ((Role::Chief, Role::Chief), 0.8),
            ((Role::Chief, Role::Staff), 0.8),
            ((Role::Staff, Role::Manager), 0.6),
            ((Role::Staff, Role::Chief), 0.6),
            ((Role::Staff, Role::Staff), 0.5),
        ]);
        RoleMultipliers { table }
    }

    pub fn empty() -> RoleMultipliers {
        RoleMultipliers {
            table: HashMap::new(),
        }
    }

    pub fn multiplier(&self, evaluator: Role, evaluated: Role) -> f64 {
        self.table
            .get(&(evaluator, evaluated))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Display transform from the backend's 1–4 scale onto 0–100.
pub fn score_to_percent(score_1_4: f64) -> f64 {
    ((score_1_4 - 1.0) / 3.0) * 100.0
}

pub fn percent_to_score(percent: f64) -> f64 {
    1.0 + 3.0 * (percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CompetencyArea};

    fn pool_question(default_weight: f64) -> PoolQuestion {
        PoolQuestion {
            id: 999,
            area: CompetencyArea::Professional,
            topic: "İş bilgisi".to_string(),
            text: "Test sorusu".to_string(),
            default_weight,
            weight_by_title: None,
            weight_by_role: None,
        }
    }

    fn person(title: &str, position: Option<&str>, role: Role) -> Person {
        Person {
            id: 500,
            name: "Test Kişi".to_string(),
            role,
            title: title.to_string(),
            department: "CBS".to_string(),
            position: position.map(|p| p.to_string()),
            registry_no: "T-1".to_string(),
            email: "test@firma.com".to_string(),
            manager_id: None,
        }
    }

    #[test]
    fn no_person_returns_default() {
        let q = pool_question(0.6);
        assert_eq!(question_weight(&q, None), 0.6);
    }

    #[test]
    fn no_overrides_returns_default_for_anyone() {
        let q = pool_question(0.5);
        for role in Role::ALL {
            let p = person("Mimar", Some("Mimar"), role);
            assert_eq!(question_weight(&q, Some(&p)), 0.5);
        }
    }

    #[test]
    fn title_override_beats_role_override() {
        let mut q = pool_question(0.6);
        q.weight_by_title = Some(HashMap::from([("CBS Uzmanı".to_string(), 0.8)]));
        q.weight_by_role = Some(HashMap::from([(Role::Staff, 0.3)]));
        let p = person("CBS Uzmanı", None, Role::Staff);
        assert_eq!(question_weight(&q, Some(&p)), 0.8);
    }

    #[test]
    fn position_matches_when_title_does_not() {
        let mut q = pool_question(0.6);
        q.weight_by_title = Some(HashMap::from([("Harita Mühendisi".to_string(), 0.75)]));
        let p = person("Uzman Yardımcısı", Some("Harita Mühendisi"), Role::Staff);
        assert_eq!(question_weight(&q, Some(&p)), 0.75);
    }

    #[test]
    fn role_override_applies_when_neither_title_nor_position_match() {
        let mut q = pool_question(0.6);
        q.weight_by_title = Some(HashMap::from([("İK Personeli".to_string(), 0.4)]));
        q.weight_by_role = Some(HashMap::from([(Role::Chief, 0.8)]));
        let p = person("Harita Şefi", None, Role::Chief);
        assert_eq!(question_weight(&q, Some(&p)), 0.8);
    }

    #[test]
    fn nothing_matches_falls_back_to_default() {
        let mut q = pool_question(0.6);
        q.weight_by_title = Some(HashMap::from([("İK Personeli".to_string(), 0.4)]));
        q.weight_by_role = Some(HashMap::from([(Role::Manager, 0.9)]));
        let p = person("Mimar", Some("Mimar"), Role::Chief);
        assert_eq!(question_weight(&q, Some(&p)), 0.6);
    }

    #[test]
    fn catalog_example_resolves_title_then_default() {
        // Question 1 carries {"CBS Uzmanı": 0.8} among its title overrides.
        let catalog = Catalog::sample();
        let q = catalog.question(1).unwrap();

        let specialist = person("CBS Uzmanı", Some("CBS Uzmanı"), Role::Staff);
        assert_eq!(question_weight(q, Some(&specialist)), 0.8);

        let architect = person("Mimar", Some("Mimar"), Role::Chief);
        assert_eq!(question_weight(q, Some(&architect)), 0.6);
    }

    #[test]
    fn resolution_is_idempotent() {
        let catalog = Catalog::sample();
        let q = catalog.question(12).unwrap();
        let p = catalog.person(11).unwrap();
        let first = question_weight(q, Some(p));
        for _ in 0..10 {
            assert_eq!(question_weight(q, Some(p)), first);
        }
    }

    #[test]
    fn standard_table_covers_all_nine_pairs() {
        let table = RoleMultipliers::standard();
        let expected = [
            (Role::Manager, Role::Manager, 1.0),
            (Role::Manager, Role::Chief, 0.9),
            (Role::Manager, Role::Staff, 1.0),
            (Role::Chief, Role::Manager, 0.7),
            (Role::Chief, Role::Chief, 0.8),
            (Role::Chief, Role::Staff, 0.8),
            (Role::Staff, Role::Manager, 0.6),
            (Role::Staff, Role::Chief, 0.6),
            (Role::Staff, Role::Staff, 0.5),
        ];
        for (evaluator, evaluated, value) in expected {
            assert_eq!(table.multiplier(evaluator, evaluated), value);
        }
    }

    #[test]
    fn missing_pair_defaults_to_neutral() {
        let table = RoleMultipliers::empty();
        assert_eq!(table.multiplier(Role::Chief, Role::Manager), 1.0);
    }

    #[test]
    fn percent_transform_round_trips() {
        assert_eq!(score_to_percent(1.0), 0.0);
        assert_eq!(score_to_percent(4.0), 100.0);
        assert!((score_to_percent(2.5) - 50.0).abs() < 1e-9);
        for s in [1.0, 1.9, 2.5, 3.3, 4.0] {
            assert!((percent_to_score(score_to_percent(s)) - s).abs() < 1e-9);
        }
    }
}
