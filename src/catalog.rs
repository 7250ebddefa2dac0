use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed role set used across the evaluation suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "MÜDÜR")]
    Manager,
    #[serde(rename = "ŞEF")]
    Chief,
    #[serde(rename = "PERSONEL")]
    Staff,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Manager, Role::Chief, Role::Staff];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Manager => "MÜDÜR",
            Role::Chief => "ŞEF",
            Role::Staff => "PERSONEL",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "MÜDÜR" => Some(Role::Manager),
            "ŞEF" => Some(Role::Chief),
            "PERSONEL" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// The three fixed competency areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetencyArea {
    #[serde(rename = "MESLEKI")]
    Professional,
    #[serde(rename = "DAVRANISSAL")]
    Behavioral,
    #[serde(rename = "BIREYSEL")]
    Individual,
}

impl CompetencyArea {
    pub const ALL: [CompetencyArea; 3] = [
        CompetencyArea::Professional,
        CompetencyArea::Behavioral,
        CompetencyArea::Individual,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CompetencyArea::Professional => "Mesleki Yeterlilik",
            CompetencyArea::Behavioral => "Davranışsal Yeterlilik",
            CompetencyArea::Individual => "Bireysel Yeterlilik",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub title: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub registry_no: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

/// A question from the reference pool, with the weight override tables the
/// resolver consults (title first, then role).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolQuestion {
    pub id: i64,
    pub area: CompetencyArea,
    pub topic: String,
    pub text: String,
    pub default_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_by_title: Option<HashMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_by_role: Option<HashMap<Role, f64>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyTypeDef {
    pub id: i64,
    pub name: String,
    pub target_role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleDef {
    pub id: i64,
    pub name: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDef {
    pub id: i64,
    pub cycle_id: i64,
    pub survey_type_id: i64,
    pub evaluatee_id: i64,
    pub evaluator_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurveyStatus {
    #[serde(rename = "Taslak")]
    Draft,
    #[serde(rename = "Tamamlandı")]
    Completed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSurveyDef {
    pub id: i64,
    pub cycle_id: i64,
    pub survey_type_id: i64,
    pub evaluatee_id: i64,
    pub evaluator_id: i64,
    pub date: String,
    pub status: SurveyStatus,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideArea {
    pub area: CompetencyArea,
    pub title: String,
    pub description: String,
    pub topics: Vec<String>,
}

/// Read-only reference data standing in for what the evaluation backend
/// serves. Built once at startup; never mutated.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub people: Vec<Person>,
    pub guide: Vec<GuideArea>,
    pub questions: Vec<PoolQuestion>,
    pub survey_types: Vec<SurveyTypeDef>,
    pub cycles: Vec<CycleDef>,
    pub assignments: Vec<AssignmentDef>,
    pub saved_surveys: Vec<SavedSurveyDef>,
}

impl Catalog {
    pub fn sample() -> Catalog {
        let people = sample_people();
        Catalog {
            people,
            guide: sample_guide(),
            questions: sample_questions(),
            survey_types: vec![
                survey_type(1, "Personel 360°", Role::Staff),
                survey_type(2, "Şef 360°", Role::Chief),
                survey_type(3, "Müdür 360°", Role::Manager),
            ],
            cycles: vec![
                CycleDef {
                    id: 1,
                    name: "2024 Yıllık 360°".to_string(),
                    year: 2024,
                },
                CycleDef {
                    id: 2,
                    name: "2025 Yıllık 360°".to_string(),
                    year: 2025,
                },
            ],
            assignments: sample_assignments(),
            saved_surveys: sample_saved_surveys(),
        }
    }

    pub fn person(&self, id: i64) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn question(&self, id: i64) -> Option<&PoolQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn survey_type(&self, id: i64) -> Option<&SurveyTypeDef> {
        self.survey_types.iter().find(|s| s.id == id)
    }

    pub fn cycle(&self, id: i64) -> Option<&CycleDef> {
        self.cycles.iter().find(|c| c.id == id)
    }

    /// Distinct job titles across the directory, sorted.
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.people.iter().map(|p| p.title.clone()).collect();
        titles.sort();
        titles.dedup();
        titles
    }
}

fn survey_type(id: i64, name: &str, target_role: Role) -> SurveyTypeDef {
    SurveyTypeDef {
        id,
        name: name.to_string(),
        target_role,
    }
}

fn manager(id: i64, name: &str, department: &str, registry_no: &str, email: &str) -> Person {
    Person {
        id,
        name: name.to_string(),
        role: Role::Manager,
        title: name.to_string(),
        department: department.to_string(),
        position: None,
        registry_no: registry_no.to_string(),
        email: email.to_string(),
        manager_id: None,
    }
}

fn chief(
    id: i64,
    name: &str,
    department: &str,
    registry_no: &str,
    email: &str,
    manager_id: i64,
) -> Person {
    Person {
        id,
        name: name.to_string(),
        role: Role::Chief,
        title: name.to_string(),
        department: department.to_string(),
        position: None,
        registry_no: registry_no.to_string(),
        email: email.to_string(),
        manager_id: Some(manager_id),
    }
}

// Staff positions cycle through six profiles, each reporting to a fixed chief.
const STAFF_POSITIONS: [(&str, i64); 6] = [
    ("Harita Mühendisi", 15),
    ("CBS Uzmanı", 15),
    ("İK Personeli", 17),
    ("Muhasebe Uzmanı", 16),
    ("Tasarım Uzmanı", 11),
    ("Mimar", 12),
];

fn sample_people() -> Vec<Person> {
    let mut people = vec![
        manager(1, "CBS Müdürü", "CBS", "M-100", "cbs.mudur@firma.com"),
        manager(2, "İdari Müdür", "İdari İşler", "M-101", "idari.mudur@firma.com"),
        manager(3, "Tasarım Müdürü", "Tasarım", "M-102", "tasarim.mudur@firma.com"),
        chief(11, "Tasarım Şefi", "Tasarım", "S-200", "tasarim.sef@firma.com", 3),
        chief(12, "Mimari Şef", "Tasarım", "S-201", "mimari.sef@firma.com", 3),
        chief(13, "Emlak Şefi", "Emlak", "S-202", "emlak.sef@firma.com", 2),
        chief(14, "Değerleme Şefi", "Emlak", "S-203", "degerleme.sef@firma.com", 2),
        chief(15, "Harita Şefi", "CBS", "S-204", "harita.sef@firma.com", 1),
        chief(16, "Muhasebe Şefi", "Finans", "S-205", "muhasebe.sef@firma.com", 2),
        chief(17, "İK Şefi", "İnsan Kaynakları", "S-206", "ik.sef@firma.com", 2),
    ];

    let chiefs: Vec<(i64, String)> = people
        .iter()
        .filter(|p| p.role == Role::Chief)
        .map(|p| (p.id, p.department.clone()))
        .collect();

    for i in 0..24_i64 {
        let (position, chief_id) = STAFF_POSITIONS[(i as usize) % STAFF_POSITIONS.len()];
        let department = chiefs
            .iter()
            .find(|(id, _)| *id == chief_id)
            .map(|(_, d)| d.clone())
            .unwrap_or_else(|| "Genel".to_string());
        people.push(Person {
            id: 100 + i,
            name: format!("P{}", i + 1),
            role: Role::Staff,
            title: position.to_string(),
            department,
            position: Some(position.to_string()),
            registry_no: format!("P-{}", 300 + i),
            email: format!("p{}@firma.com", i + 1),
            manager_id: Some(chief_id),
        });
    }

    people
}

fn guide_area(area: CompetencyArea, description: &str, topics: &[&str]) -> GuideArea {
    GuideArea {
        area,
        title: area.title().to_string(),
        description: description.to_string(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
    }
}

fn sample_guide() -> Vec<GuideArea> {
    vec![
        guide_area(
            CompetencyArea::Professional,
            "Pozisyona özgü teknik bilgi, çıktı kalitesi ve sorumluluk alma düzeyi.",
            &[
                "İş bilgisi",
                "Verimlilik",
                "İş kalitesi",
                "Sorumluluk",
                "Problem çözme ve üretkenlik",
            ],
        ),
        guide_area(
            CompetencyArea::Behavioral,
            "İşbirliği, iletişim, ekip çalışması ve liderlik davranışları.",
            &[
                "İnsan ilişkileri",
                "Organizasyon becerisi",
                "Öğrenmeye yatkınlık",
                "Takım çalışması",
                "Liderlik",
                "İletişim becerisi",
            ],
        ),
        guide_area(
            CompetencyArea::Individual,
            "Kişisel disiplin, inisiyatif, zaman yönetimi ve işe bağlılık.",
            &[
                "Karar verebilme",
                "Planlı çalışma",
                "İşe bağlılık",
                "İnisiyatif alma",
                "Zamanı yönetebilme",
            ],
        ),
    ]
}

fn question(
    id: i64,
    area: CompetencyArea,
    topic: &str,
    text: &str,
    default_weight: f64,
) -> PoolQuestion {
    PoolQuestion {
        id,
        area,
        topic: topic.to_string(),
        text: text.to_string(),
        default_weight,
        weight_by_title: None,
        weight_by_role: None,
    }
}

fn title_weights(pairs: &[(&str, f64)]) -> Option<HashMap<String, f64>> {
    Some(
        pairs
            .iter()
            .map(|(title, w)| (title.to_string(), *w))
            .collect(),
    )
}

fn role_weights(pairs: &[(Role, f64)]) -> Option<HashMap<Role, f64>> {
    Some(pairs.iter().copied().collect())
}

fn sample_questions() -> Vec<PoolQuestion> {
    use CompetencyArea::{Behavioral, Individual, Professional};

    let mut questions = vec![
        question(
            1,
            Professional,
            "İş bilgisi",
            "Görev alanına ilişkin güncel teknik bilgilere hakimdir.",
            0.6,
        ),
        question(
            2,
            Professional,
            "İş bilgisi",
            "Yeni yöntem ve teknolojileri takip ederek işine uygular.",
            0.6,
        ),
        question(
            3,
            Professional,
            "Verimlilik",
            "Kaynakları (zaman, ekipman vb.) verimli kullanır.",
            0.5,
        ),
        question(
            4,
            Professional,
            "Verimlilik",
            "İşleri planlanan süreler içinde tamamlar.",
            0.5,
        ),
        question(
            5,
            Professional,
            "İş kalitesi",
            "Ürettiği işin doğruluk ve detay kalitesi yüksektir.",
            0.7,
        ),
        question(
            6,
            Professional,
            "Sorumluluk",
            "Hatalarını sahiplenir, düzeltmek için inisiyatif alır.",
            0.5,
        ),
        question(
            7,
            Professional,
            "Problem çözme ve üretkenlik",
            "Karşılaştığı sorunlara pratik ve uygulanabilir çözümler üretir.",
            0.7,
        ),
        question(
            8,
            Behavioral,
            "İnsan ilişkileri",
            "Çalışma arkadaşlarıyla saygılı ve yapıcı ilişki kurar.",
            0.6,
        ),
        question(
            9,
            Behavioral,
            "Organizasyon becerisi",
            "İşi organize eder, önceliklendirme yapar.",
            0.6,
        ),
        question(
            10,
            Behavioral,
            "Öğrenmeye yatkınlık",
            "Yeni bilgilere açıktır, geri bildirimden öğrenir.",
            0.5,
        ),
        question(
            11,
            Behavioral,
            "Takım çalışması",
            "Ekip hedeflerine katkı sağlamak için işbirliği yapar.",
            0.6,
        ),
        question(
            12,
            Behavioral,
            "Liderlik",
            "Ekip arkadaşlarını hedefe yönlendirebilir.",
            0.6,
        ),
        question(
            13,
            Behavioral,
            "Liderlik",
            "Karar süreçlerinde ekibi sürece dahil eder.",
            0.5,
        ),
        question(
            14,
            Behavioral,
            "İletişim becerisi",
            "Bilgiyi açık, anlaşılır ve zamanında paylaşır.",
            0.7,
        ),
        question(
            15,
            Individual,
            "Karar verebilme",
            "Bilgi ve veriler ışığında zamanında karar alır.",
            0.5,
        ),
        question(
            16,
            Individual,
            "Planlı çalışma",
            "İş planı oluşturur, taahhüt ettiği işleri takip eder.",
            0.6,
        ),
        question(
            17,
            Individual,
            "İşe bağlılık",
            "Kurum hedeflerine ve değerlere bağlılık gösterir.",
            0.5,
        ),
        question(
            18,
            Individual,
            "İnisiyatif alma",
            "Gerekli durumlarda yönlendirme beklemeden harekete geçer.",
            0.6,
        ),
        question(
            19,
            Individual,
            "Zamanı yönetebilme",
            "Önceliklerine göre zamanını dengeli kullanır.",
            0.6,
        ),
        question(
            20,
            Individual,
            "Zamanı yönetebilme",
            "Yoğun dönemlerde teslim tarihlerini korur.",
            0.5,
        ),
    ];

    questions[0].weight_by_title = title_weights(&[
        ("İK Personeli", 0.4),
        ("Harita Mühendisi", 0.8),
        ("CBS Uzmanı", 0.8),
    ]);
    questions[11].weight_by_role = role_weights(&[(Role::Manager, 0.9), (Role::Chief, 0.8)]);
    questions[12].weight_by_role = role_weights(&[(Role::Manager, 0.8), (Role::Chief, 0.7)]);
    questions[13].weight_by_role = role_weights(&[(Role::Manager, 1.0), (Role::Chief, 0.8)]);
    questions[18].weight_by_role = role_weights(&[(Role::Manager, 1.0), (Role::Chief, 0.8)]);

    questions
}

fn sample_assignments() -> Vec<AssignmentDef> {
    fn assignment(
        id: i64,
        cycle_id: i64,
        survey_type_id: i64,
        evaluatee_id: i64,
        evaluator_ids: &[i64],
    ) -> AssignmentDef {
        AssignmentDef {
            id,
            cycle_id,
            survey_type_id,
            evaluatee_id,
            evaluator_ids: evaluator_ids.to_vec(),
        }
    }

    vec![
        assignment(1, 1, 3, 1, &[11, 15, 100, 101, 102]),
        assignment(2, 1, 2, 11, &[1, 100, 101, 102, 103]),
        assignment(3, 1, 1, 100, &[11, 1]),
        assignment(4, 2, 3, 2, &[13, 16, 104, 105, 106]),
        assignment(5, 2, 2, 15, &[1, 100, 101, 107, 108]),
        assignment(6, 2, 1, 105, &[15, 1]),
    ]
}

fn sample_saved_surveys() -> Vec<SavedSurveyDef> {
    fn saved(
        id: i64,
        cycle_id: i64,
        survey_type_id: i64,
        evaluatee_id: i64,
        evaluator_id: i64,
        date: &str,
        status: SurveyStatus,
        avg_score: f64,
    ) -> SavedSurveyDef {
        SavedSurveyDef {
            id,
            cycle_id,
            survey_type_id,
            evaluatee_id,
            evaluator_id,
            date: date.to_string(),
            status,
            avg_score,
        }
    }

    vec![
        saved(1, 1, 1, 100, 11, "2024-03-10", SurveyStatus::Completed, 82.0),
        saved(2, 1, 2, 11, 1, "2024-03-11", SurveyStatus::Draft, 79.0),
        saved(3, 2, 3, 2, 13, "2025-04-02", SurveyStatus::Completed, 88.0),
        saved(4, 2, 1, 105, 15, "2025-04-05", SurveyStatus::Draft, 75.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_links_resolve() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.people.len(), 34);
        for person in &catalog.people {
            if let Some(mid) = person.manager_id {
                assert!(
                    catalog.person(mid).is_some(),
                    "manager {} of {} missing",
                    mid,
                    person.id
                );
            }
        }
        // Every staff member carries a position label and reports to a chief.
        for person in catalog.people.iter().filter(|p| p.role == Role::Staff) {
            assert!(person.position.is_some());
            let manager = catalog.person(person.manager_id.expect("staff manager")).unwrap();
            assert_eq!(manager.role, Role::Chief);
            assert_eq!(manager.department, person.department);
        }
    }

    #[test]
    fn question_pool_matches_topic_guide() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.questions.len(), 20);
        assert_eq!(catalog.guide.len(), 3);
        for q in &catalog.questions {
            let area = catalog
                .guide
                .iter()
                .find(|g| g.area == q.area)
                .expect("guide area");
            assert!(
                area.topics.contains(&q.topic),
                "topic {} not listed under {}",
                q.topic,
                area.title
            );
        }
    }

    #[test]
    fn titles_are_distinct_and_sorted() {
        let catalog = Catalog::sample();
        let titles = catalog.titles();
        let mut sorted = titles.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(titles, sorted);
        assert!(titles.iter().any(|t| t == "CBS Uzmanı"));
        assert!(titles.iter().any(|t| t == "Harita Şefi"));
    }

    #[test]
    fn assignments_reference_known_people_and_cycles() {
        let catalog = Catalog::sample();
        for a in &catalog.assignments {
            assert!(catalog.cycle(a.cycle_id).is_some());
            assert!(catalog.survey_type(a.survey_type_id).is_some());
            assert!(catalog.person(a.evaluatee_id).is_some());
            for e in &a.evaluator_ids {
                assert!(catalog.person(*e).is_some());
            }
        }
    }
}
