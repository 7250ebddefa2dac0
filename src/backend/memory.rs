use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::backend::{
    AnswerBatch, Backend, BackendError, CategoryRef, CategoryRow, PersonRow, PersonScoreRow,
    PeriodRow, TemplateDetail, TemplateQuestion, TemplateRow, TemplateTopic, TitleAssignment,
    TopicRow, TopicWeight, WeightSetDetail, WeightSetRow,
};
use crate::calc::percent_to_score;
use crate::catalog::{Catalog, Role};

/// Sample-data implementation of the evaluation service. Everything lives in
/// an in-memory SQLite database seeded from the catalog; nothing touches the
/// filesystem.
pub struct MemoryBackend {
    conn: Connection,
}

impl MemoryBackend {
    pub fn seeded(catalog: &Catalog) -> Result<MemoryBackend, BackendError> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        create_schema(&conn)?;
        seed(&conn, catalog)?;
        Ok(MemoryBackend { conn })
    }

    fn category_exists(&self, id: i64) -> Result<bool, BackendError> {
        exists(&self.conn, "SELECT 1 FROM categories WHERE id = ?", id)
    }

    fn topic_exists(&self, id: i64) -> Result<bool, BackendError> {
        exists(&self.conn, "SELECT 1 FROM topics WHERE id = ?", id)
    }

    fn template_exists(&self, id: i64) -> Result<bool, BackendError> {
        exists(&self.conn, "SELECT 1 FROM templates WHERE id = ?", id)
    }

    fn weight_set_exists(&self, id: i64) -> Result<bool, BackendError> {
        exists(&self.conn, "SELECT 1 FROM weight_sets WHERE id = ?", id)
    }
}

fn create_schema(conn: &Connection) -> Result<(), BackendError> {
    conn.execute(
        "CREATE TABLE people(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            title TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE categories(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE topics(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            category_id INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES categories(id),
            UNIQUE(category_id, name)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE questions(
            id INTEGER PRIMARY KEY,
            text TEXT NOT NULL,
            weight REAL NOT NULL,
            topic_id INTEGER NOT NULL,
            FOREIGN KEY(topic_id) REFERENCES topics(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE templates(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE template_topics(
            template_id INTEGER NOT NULL,
            topic_id INTEGER NOT NULL,
            PRIMARY KEY(template_id, topic_id),
            FOREIGN KEY(template_id) REFERENCES templates(id),
            FOREIGN KEY(topic_id) REFERENCES topics(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE periods(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            starts_on TEXT NOT NULL,
            ends_on TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE weight_sets(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE topic_weights(
            weight_set_id INTEGER NOT NULL,
            topic_id INTEGER NOT NULL,
            weight REAL NOT NULL,
            PRIMARY KEY(weight_set_id, topic_id),
            FOREIGN KEY(weight_set_id) REFERENCES weight_sets(id),
            FOREIGN KEY(topic_id) REFERENCES topics(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE title_assignments(
            title TEXT PRIMARY KEY,
            weight_set_id INTEGER NOT NULL,
            FOREIGN KEY(weight_set_id) REFERENCES weight_sets(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE answers(
            id TEXT PRIMARY KEY,
            period_id INTEGER NOT NULL,
            template_id INTEGER NOT NULL,
            evaluator_id TEXT,
            evaluatee_id TEXT NOT NULL,
            question_id INTEGER NOT NULL,
            score INTEGER NOT NULL,
            FOREIGN KEY(period_id) REFERENCES periods(id),
            FOREIGN KEY(template_id) REFERENCES templates(id),
            FOREIGN KEY(question_id) REFERENCES questions(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX idx_topics_category ON topics(category_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX idx_questions_topic ON questions(topic_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX idx_answers_lookup ON answers(period_id, template_id, evaluatee_id)",
        [],
    )?;
    Ok(())
}

fn seed(conn: &Connection, catalog: &Catalog) -> Result<(), BackendError> {
    for person in &catalog.people {
        conn.execute(
            "INSERT INTO people(id, name, role, title) VALUES(?, ?, ?, ?)",
            (
                person.id.to_string(),
                &person.name,
                person.role.as_str(),
                &person.title,
            ),
        )?;
    }

    for guide in &catalog.guide {
        conn.execute(
            "INSERT INTO categories(name, description) VALUES(?, ?)",
            (&guide.title, &guide.description),
        )?;
        let category_id = conn.last_insert_rowid();
        for topic in &guide.topics {
            conn.execute(
                "INSERT INTO topics(name, category_id) VALUES(?, ?)",
                (topic, category_id),
            )?;
        }
    }

    for q in &catalog.questions {
        let topic_id: i64 = conn.query_row(
            "SELECT t.id FROM topics t
             JOIN categories c ON c.id = t.category_id
             WHERE t.name = ? AND c.name = ?",
            (&q.topic, q.area.title()),
            |r| r.get(0),
        )?;
        conn.execute(
            "INSERT INTO questions(text, weight, topic_id) VALUES(?, ?, ?)",
            (&q.text, q.default_weight, topic_id),
        )?;
    }

    // One template per survey type, carrying the whole topic library.
    for st in &catalog.survey_types {
        conn.execute("INSERT INTO templates(name) VALUES(?)", [&st.name])?;
        let template_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO template_topics(template_id, topic_id)
             SELECT ?, id FROM topics",
            [template_id],
        )?;
    }

    for cycle in &catalog.cycles {
        conn.execute(
            "INSERT INTO periods(name, starts_on, ends_on) VALUES(?, ?, ?)",
            (
                &cycle.name,
                format!("{}-01-01", cycle.year),
                format!("{}-12-31", cycle.year),
            ),
        )?;
    }

    Ok(())
}

fn exists(conn: &Connection, sql: &str, id: i64) -> Result<bool, BackendError> {
    let found: Option<i64> = conn.query_row(sql, [id], |r| r.get(0)).optional()?;
    Ok(found.is_some())
}

fn required_name(name: &str, what: &str) -> Result<String, BackendError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BackendError::Invalid(format!("{} name must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

fn check_weight(weight: f64) -> Result<(), BackendError> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(BackendError::Invalid(
            "weight must be between 0.00 and 1.00".to_string(),
        ));
    }
    Ok(())
}

fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn person_seed(person_id: &str) -> i64 {
    person_id
        .parse::<i64>()
        .unwrap_or_else(|_| person_id.bytes().map(i64::from).sum())
}

// Placeholder series matching the demo report data; the real aggregate comes
// from the scoring service.
fn placeholder_percent(seed: i64) -> f64 {
    let mut total = 0.0;
    for i in 0..3_i64 {
        let v = (65 + (seed + i * 7).rem_euclid(30)).clamp(60, 100);
        total += v as f64;
    }
    total / 3.0
}

impl Backend for MemoryBackend {
    fn mode(&self) -> &'static str {
        "memory"
    }

    fn list_people(&self) -> Result<Vec<PersonRow>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, role, title FROM people ORDER BY CAST(id AS INTEGER)")?;
        let rows = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut people = Vec::with_capacity(rows.len());
        for (id, name, role, title) in rows {
            let role = Role::parse(&role)
                .ok_or_else(|| BackendError::Store(format!("unknown role: {}", role)))?;
            people.push(PersonRow {
                id,
                name,
                role,
                title,
            });
        }
        Ok(people)
    }

    fn list_titles(&self) -> Result<Vec<String>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT title FROM people ORDER BY title")?;
        let titles = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(titles)
    }

    fn list_categories(&self) -> Result<Vec<CategoryRow>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM categories ORDER BY id")?;
        let rows = stmt
            .query_map([], |r| {
                Ok(CategoryRow {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    description: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn create_category(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CategoryRow, BackendError> {
        let name = required_name(name, "category")?;
        let description = clean_description(description);
        self.conn
            .execute(
                "INSERT INTO categories(name, description) VALUES(?, ?)",
                (&name, &description),
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(f, _)
                    if f.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    BackendError::Invalid(format!("category {} already exists", name))
                }
                other => other.into(),
            })?;
        Ok(CategoryRow {
            id: self.conn.last_insert_rowid(),
            name,
            description,
        })
    }

    fn delete_category(&mut self, id: i64) -> Result<(), BackendError> {
        if !self.category_exists(id)? {
            return Err(BackendError::NotFound("category not found".to_string()));
        }
        let topic_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM topics WHERE category_id = ?",
            [id],
            |r| r.get(0),
        )?;
        if topic_count > 0 {
            return Err(BackendError::Invalid(
                "category still has topics; delete them first".to_string(),
            ));
        }
        self.conn
            .execute("DELETE FROM categories WHERE id = ?", [id])?;
        Ok(())
    }

    fn list_topics(&self) -> Result<Vec<TopicRow>, BackendError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.description, c.id, c.name
             FROM topics t
             JOIN categories c ON c.id = t.category_id
             ORDER BY c.id, t.id",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(TopicRow {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    description: r.get(2)?,
                    category: Some(CategoryRef {
                        id: r.get(3)?,
                        name: r.get(4)?,
                    }),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn create_topic(
        &mut self,
        name: &str,
        description: Option<&str>,
        category_id: i64,
    ) -> Result<TopicRow, BackendError> {
        let name = required_name(name, "topic")?;
        if !self.category_exists(category_id)? {
            return Err(BackendError::NotFound("category not found".to_string()));
        }
        let description = clean_description(description);
        self.conn.execute(
            "INSERT INTO topics(name, description, category_id) VALUES(?, ?, ?)",
            (&name, &description, category_id),
        )?;
        let id = self.conn.last_insert_rowid();
        let category_name: String =
            self.conn
                .query_row("SELECT name FROM categories WHERE id = ?", [category_id], |r| {
                    r.get(0)
                })?;
        Ok(TopicRow {
            id,
            name,
            description,
            category: Some(CategoryRef {
                id: category_id,
                name: category_name,
            }),
        })
    }

    fn delete_topic(&mut self, id: i64) -> Result<(), BackendError> {
        if !self.topic_exists(id)? {
            return Err(BackendError::NotFound("topic not found".to_string()));
        }
        let question_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE topic_id = ?",
            [id],
            |r| r.get(0),
        )?;
        if question_count > 0 {
            return Err(BackendError::Invalid(
                "topic still has questions; delete them first".to_string(),
            ));
        }
        // Detach from templates and weight sets before removing the topic.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM template_topics WHERE topic_id = ?", [id])?;
        tx.execute("DELETE FROM topic_weights WHERE topic_id = ?", [id])?;
        tx.execute("DELETE FROM topics WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(())
    }

    fn create_question(
        &mut self,
        text: &str,
        weight: f64,
        topic_id: i64,
    ) -> Result<(), BackendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::Invalid(
                "question text must not be empty".to_string(),
            ));
        }
        check_weight(weight)?;
        if !self.topic_exists(topic_id)? {
            return Err(BackendError::NotFound("topic not found".to_string()));
        }
        self.conn.execute(
            "INSERT INTO questions(text, weight, topic_id) VALUES(?, ?, ?)",
            (text, weight, topic_id),
        )?;
        Ok(())
    }

    fn list_templates(&self) -> Result<Vec<TemplateRow>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM templates ORDER BY id")?;
        let rows = stmt
            .query_map([], |r| {
                Ok(TemplateRow {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    description: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn create_template(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<TemplateRow, BackendError> {
        let name = required_name(name, "template")?;
        let description = clean_description(description);
        self.conn.execute(
            "INSERT INTO templates(name, description) VALUES(?, ?)",
            (&name, &description),
        )?;
        Ok(TemplateRow {
            id: self.conn.last_insert_rowid(),
            name,
            description,
        })
    }

    fn template_detail(&self, id: i64) -> Result<TemplateDetail, BackendError> {
        let name: Option<String> = self
            .conn
            .query_row("SELECT name FROM templates WHERE id = ?", [id], |r| r.get(0))
            .optional()?;
        let Some(name) = name else {
            return Err(BackendError::NotFound("template not found".to_string()));
        };

        let mut topic_stmt = self.conn.prepare(
            "SELECT t.id, t.name
             FROM template_topics tt
             JOIN topics t ON t.id = tt.topic_id
             WHERE tt.template_id = ?
             ORDER BY t.id",
        )?;
        let topic_rows = topic_stmt
            .query_map([id], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut question_stmt = self
            .conn
            .prepare("SELECT id, text, weight FROM questions WHERE topic_id = ? ORDER BY id")?;
        let mut topics = Vec::with_capacity(topic_rows.len());
        for (topic_id, topic_name) in topic_rows {
            let questions = question_stmt
                .query_map([topic_id], |r| {
                    Ok(TemplateQuestion {
                        id: r.get(0)?,
                        text: r.get(1)?,
                        weight: r.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            topics.push(TemplateTopic {
                id: topic_id,
                name: topic_name,
                questions,
            });
        }

        Ok(TemplateDetail { id, name, topics })
    }

    fn attach_topic(&mut self, template_id: i64, topic_id: i64) -> Result<(), BackendError> {
        if !self.template_exists(template_id)? {
            return Err(BackendError::NotFound("template not found".to_string()));
        }
        if !self.topic_exists(topic_id)? {
            return Err(BackendError::NotFound("topic not found".to_string()));
        }
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO template_topics(template_id, topic_id) VALUES(?, ?)",
            (template_id, topic_id),
        )?;
        if changed == 0 {
            return Err(BackendError::Invalid(
                "topic already attached to template".to_string(),
            ));
        }
        Ok(())
    }

    fn detach_topic(&mut self, template_id: i64, topic_id: i64) -> Result<(), BackendError> {
        let changed = self.conn.execute(
            "DELETE FROM template_topics WHERE template_id = ? AND topic_id = ?",
            (template_id, topic_id),
        )?;
        if changed == 0 {
            return Err(BackendError::NotFound(
                "topic is not attached to template".to_string(),
            ));
        }
        Ok(())
    }

    fn list_periods(&self) -> Result<Vec<PeriodRow>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, starts_on, ends_on FROM periods ORDER BY starts_on")?;
        let rows = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut periods = Vec::with_capacity(rows.len());
        for (id, name, starts_on, ends_on) in rows {
            periods.push(PeriodRow {
                id,
                name,
                starts_on: parse_stored_date(&starts_on)?,
                ends_on: parse_stored_date(&ends_on)?,
            });
        }
        Ok(periods)
    }

    fn create_period(
        &mut self,
        name: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<PeriodRow, BackendError> {
        let name = required_name(name, "period")?;
        check_period_dates(starts_on, ends_on)?;
        self.conn.execute(
            "INSERT INTO periods(name, starts_on, ends_on) VALUES(?, ?, ?)",
            (&name, starts_on.to_string(), ends_on.to_string()),
        )?;
        Ok(PeriodRow {
            id: self.conn.last_insert_rowid(),
            name,
            starts_on,
            ends_on,
        })
    }

    fn update_period(
        &mut self,
        id: i64,
        name: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<PeriodRow, BackendError> {
        let name = required_name(name, "period")?;
        check_period_dates(starts_on, ends_on)?;
        let changed = self.conn.execute(
            "UPDATE periods SET name = ?, starts_on = ?, ends_on = ? WHERE id = ?",
            (&name, starts_on.to_string(), ends_on.to_string(), id),
        )?;
        if changed == 0 {
            return Err(BackendError::NotFound("period not found".to_string()));
        }
        Ok(PeriodRow {
            id,
            name,
            starts_on,
            ends_on,
        })
    }

    fn delete_period(&mut self, id: i64) -> Result<(), BackendError> {
        if !exists(&self.conn, "SELECT 1 FROM periods WHERE id = ?", id)? {
            return Err(BackendError::NotFound("period not found".to_string()));
        }
        // Submissions recorded against the period go with it.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM answers WHERE period_id = ?", [id])?;
        tx.execute("DELETE FROM periods WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(())
    }

    fn list_weight_sets(&self) -> Result<Vec<WeightSetRow>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM weight_sets ORDER BY id")?;
        let rows = stmt
            .query_map([], |r| {
                Ok(WeightSetRow {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    description: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn create_weight_set(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<WeightSetRow, BackendError> {
        let name = required_name(name, "weight set")?;
        let description = clean_description(description);
        self.conn.execute(
            "INSERT INTO weight_sets(name, description) VALUES(?, ?)",
            (&name, &description),
        )?;
        Ok(WeightSetRow {
            id: self.conn.last_insert_rowid(),
            name,
            description,
        })
    }

    fn delete_weight_set(&mut self, id: i64) -> Result<(), BackendError> {
        if !self.weight_set_exists(id)? {
            return Err(BackendError::NotFound("weight set not found".to_string()));
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM topic_weights WHERE weight_set_id = ?", [id])?;
        tx.execute("DELETE FROM title_assignments WHERE weight_set_id = ?", [id])?;
        tx.execute("DELETE FROM weight_sets WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(())
    }

    fn weight_set_detail(&self, id: i64) -> Result<WeightSetDetail, BackendError> {
        let name: Option<String> = self
            .conn
            .query_row("SELECT name FROM weight_sets WHERE id = ?", [id], |r| r.get(0))
            .optional()?;
        let Some(name) = name else {
            return Err(BackendError::NotFound("weight set not found".to_string()));
        };
        let mut stmt = self.conn.prepare(
            "SELECT tw.topic_id, t.name, tw.weight
             FROM topic_weights tw
             JOIN topics t ON t.id = tw.topic_id
             WHERE tw.weight_set_id = ?
             ORDER BY tw.topic_id",
        )?;
        let topic_weights = stmt
            .query_map([id], |r| {
                Ok(TopicWeight {
                    topic_id: r.get(0)?,
                    topic_name: r.get(1)?,
                    weight: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WeightSetDetail {
            id,
            name,
            topic_weights,
        })
    }

    fn set_topic_weight(
        &mut self,
        set_id: i64,
        topic_id: i64,
        weight: f64,
    ) -> Result<(), BackendError> {
        check_weight(weight)?;
        if !self.weight_set_exists(set_id)? {
            return Err(BackendError::NotFound("weight set not found".to_string()));
        }
        if !self.topic_exists(topic_id)? {
            return Err(BackendError::NotFound("topic not found".to_string()));
        }
        if weight == 0.0 {
            // Weight zero clears the override.
            self.conn.execute(
                "DELETE FROM topic_weights WHERE weight_set_id = ? AND topic_id = ?",
                (set_id, topic_id),
            )?;
            return Ok(());
        }
        self.conn.execute(
            "INSERT INTO topic_weights(weight_set_id, topic_id, weight) VALUES(?, ?, ?)
             ON CONFLICT(weight_set_id, topic_id) DO UPDATE SET weight = excluded.weight",
            (set_id, topic_id, weight),
        )?;
        Ok(())
    }

    fn list_title_assignments(&self) -> Result<Vec<TitleAssignment>, BackendError> {
        let mut stmt = self.conn.prepare(
            "SELECT ta.title, ws.id, ws.name
             FROM title_assignments ta
             JOIN weight_sets ws ON ws.id = ta.weight_set_id
             ORDER BY ta.title",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(TitleAssignment {
                    title: r.get(0)?,
                    weight_set_id: r.get(1)?,
                    weight_set_name: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn assign_title(&mut self, title: &str, set_id: i64) -> Result<(), BackendError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BackendError::Invalid("title must not be empty".to_string()));
        }
        let known: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM people WHERE title = ? LIMIT 1", [title], |r| {
                r.get(0)
            })
            .optional()?;
        if known.is_none() {
            return Err(BackendError::NotFound(format!("unknown title: {}", title)));
        }
        if !self.weight_set_exists(set_id)? {
            return Err(BackendError::NotFound("weight set not found".to_string()));
        }
        self.conn.execute(
            "INSERT INTO title_assignments(title, weight_set_id) VALUES(?, ?)
             ON CONFLICT(title) DO UPDATE SET weight_set_id = excluded.weight_set_id",
            (title, set_id),
        )?;
        Ok(())
    }

    fn remove_title_assignment(&mut self, title: &str) -> Result<(), BackendError> {
        let changed = self
            .conn
            .execute("DELETE FROM title_assignments WHERE title = ?", [title])?;
        if changed == 0 {
            return Err(BackendError::NotFound(format!(
                "no assignment for title: {}",
                title
            )));
        }
        Ok(())
    }

    fn overall_scores(
        &self,
        period_id: i64,
        template_id: i64,
    ) -> Result<Vec<PersonScoreRow>, BackendError> {
        if !exists(&self.conn, "SELECT 1 FROM periods WHERE id = ?", period_id)? {
            return Err(BackendError::NotFound("period not found".to_string()));
        }
        if !self.template_exists(template_id)? {
            return Err(BackendError::NotFound("template not found".to_string()));
        }
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM people ORDER BY CAST(id AS INTEGER)")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| {
                let score = percent_to_score(placeholder_percent(person_seed(&id)));
                PersonScoreRow {
                    person_id: id,
                    name,
                    score,
                }
            })
            .collect())
    }

    fn person_score(
        &self,
        person_id: &str,
        period_id: i64,
        template_id: i64,
    ) -> Result<f64, BackendError> {
        if !exists(&self.conn, "SELECT 1 FROM periods WHERE id = ?", period_id)? {
            return Err(BackendError::NotFound("period not found".to_string()));
        }
        if !self.template_exists(template_id)? {
            return Err(BackendError::NotFound("template not found".to_string()));
        }
        let known: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM people WHERE id = ?", [person_id], |r| r.get(0))
            .optional()?;
        if known.is_none() {
            return Err(BackendError::NotFound("person not found".to_string()));
        }
        Ok(percent_to_score(placeholder_percent(person_seed(person_id))))
    }

    fn submit_answers(&mut self, batch: &AnswerBatch) -> Result<(), BackendError> {
        if batch.answers.is_empty() {
            return Err(BackendError::Invalid(
                "a submission needs at least one answer".to_string(),
            ));
        }
        if !exists(&self.conn, "SELECT 1 FROM periods WHERE id = ?", batch.period_id)? {
            return Err(BackendError::NotFound("period not found".to_string()));
        }
        if !self.template_exists(batch.template_id)? {
            return Err(BackendError::NotFound("template not found".to_string()));
        }
        for person_id in std::iter::once(&batch.evaluatee_id).chain(batch.evaluator_id.iter()) {
            let known: Option<i64> = self
                .conn
                .query_row("SELECT 1 FROM people WHERE id = ?", [person_id], |r| r.get(0))
                .optional()?;
            if known.is_none() {
                return Err(BackendError::NotFound(format!(
                    "person not found: {}",
                    person_id
                )));
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut membership = tx.prepare(
                "SELECT 1 FROM questions q
                 JOIN template_topics tt ON tt.topic_id = q.topic_id
                 WHERE q.id = ? AND tt.template_id = ?",
            )?;
            let mut insert = tx.prepare(
                "INSERT INTO answers(id, period_id, template_id, evaluator_id, evaluatee_id, question_id, score)
                 VALUES(?, ?, ?, ?, ?, ?, ?)",
            )?;
            for answer in &batch.answers {
                if !(1..=4).contains(&answer.score) {
                    return Err(BackendError::Invalid(format!(
                        "score for question {} must be between 1 and 4",
                        answer.question_id
                    )));
                }
                let in_template: Option<i64> = membership
                    .query_row((answer.question_id, batch.template_id), |r| r.get(0))
                    .optional()?;
                if in_template.is_none() {
                    return Err(BackendError::Invalid(format!(
                        "question {} is not part of the template",
                        answer.question_id
                    )));
                }
                insert.execute((
                    Uuid::new_v4().to_string(),
                    batch.period_id,
                    batch.template_id,
                    &batch.evaluator_id,
                    &batch.evaluatee_id,
                    answer.question_id,
                    answer.score,
                ))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_stored_date(raw: &str) -> Result<NaiveDate, BackendError> {
    raw.parse::<NaiveDate>()
        .map_err(|_| BackendError::Store(format!("bad stored date: {}", raw)))
}

fn check_period_dates(starts_on: NaiveDate, ends_on: NaiveDate) -> Result<(), BackendError> {
    if ends_on < starts_on {
        return Err(BackendError::Invalid(
            "period end date precedes its start date".to_string(),
        ));
    }
    Ok(())
}
