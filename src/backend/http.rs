use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::backend::{
    AnswerBatch, Backend, BackendError, CategoryRef, CategoryRow, PersonRow, PersonScoreRow,
    PeriodRow, TemplateDetail, TemplateQuestion, TemplateRow, TemplateTopic, TitleAssignment,
    TopicRow, TopicWeight, WeightSetDetail, WeightSetRow,
};
use crate::catalog::Role;

/// Every response body arrives as `{ "data": T }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Client for the real evaluation service. Blocking by design: the daemon
/// handles one request at a time, so there is nothing to overlap.
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<HttpBackend, BackendError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| BackendError::Invalid(format!("bad base url {}: {}", base_url, e)))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Ok(HttpBackend { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Path with one percent-encoded trailing segment (job titles carry
    /// spaces and non-ASCII).
    fn url_with_segment(&self, path: &str, segment: &str) -> Result<String, BackendError> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| BackendError::Invalid(format!("bad url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Invalid("base url cannot carry paths".to_string()))?
            .push(segment);
        Ok(url.to_string())
    }

    fn check(url: &str, result: Result<Response, reqwest::Error>) -> Result<Response, BackendError> {
        let response = result.map_err(|e| {
            tracing::error!(url, error = %e, "backend request failed");
            BackendError::Http(e.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(url, status = %status, "backend rejected request");
            return Err(BackendError::Rejected(format!("{} for {}", status, url)));
        }
        Ok(response)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        let response = Self::check(&url, self.http.get(&url).send())?;
        let envelope: Envelope<T> = response.json().map_err(|e| {
            tracing::error!(url, error = %e, "backend response did not parse");
            BackendError::Http(e.to_string())
        })?;
        Ok(envelope.data)
    }

    fn post(&self, path: &str, body: &serde_json::Value) -> Result<(), BackendError> {
        let url = self.url(path);
        Self::check(&url, self.http.post(&url).json(body).send())?;
        Ok(())
    }

    fn put(&self, path: &str, body: &serde_json::Value) -> Result<(), BackendError> {
        let url = self.url(path);
        Self::check(&url, self.http.put(&url).json(body).send())?;
        Ok(())
    }

    fn delete(&self, url: String) -> Result<(), BackendError> {
        Self::check(&url, self.http.delete(&url).send())?;
        Ok(())
    }

    /// The admin pages re-fetch after every mutation instead of trusting the
    /// create response; resolving the new row from the list keeps this client
    /// independent of whatever the POST happens to return.
    fn find_created<T, F>(rows: Vec<T>, mut matches: F, what: &str) -> Result<T, BackendError>
    where
        F: FnMut(&T) -> bool,
    {
        rows.into_iter()
            .rev()
            .find(|row| matches(row))
            .ok_or_else(|| BackendError::Rejected(format!("created {} not visible in list", what)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonelDto {
    id: String,
    isim: String,
    soyisim: String,
    rol: Role,
    unvan: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnaBaslikDto {
    id: i64,
    ad: String,
    #[serde(default)]
    aciklama: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KonuDto {
    id: i64,
    ad: String,
    #[serde(default)]
    aciklama: Option<String>,
    #[serde(default)]
    ana_baslik: Option<AnaBaslikDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SablonDto {
    id: i64,
    ad: String,
    #[serde(default)]
    aciklama: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SoruDto {
    id: i64,
    metin: String,
    agirlik: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SablonKonuDto {
    id: i64,
    ad: String,
    #[serde(default)]
    sorular: Vec<SoruDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SablonDetayDto {
    id: i64,
    ad: String,
    #[serde(default)]
    konu_basliklari: Vec<SablonKonuDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DonemDto {
    id: i64,
    ad: String,
    baslangic_tarihi: String,
    bitis_tarihi: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KonuAgirligiDto {
    agirlik: f64,
    konu_baslik: KonuDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgirlikSetiDetayDto {
    id: i64,
    ad: String,
    #[serde(default)]
    konu_agirliklari: Vec<KonuAgirligiDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnvanAtamasiDto {
    unvan: String,
    agirlik_seti: SablonDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenelSkorDto {
    personel_id: String,
    #[serde(default)]
    isim: Option<String>,
    #[serde(default)]
    soyisim: Option<String>,
    skor: f64,
}

#[derive(Debug, Deserialize)]
struct SkorDto {
    skor: f64,
}

/// Periods arrive as ISO datetimes; only the date part matters here.
fn parse_wire_date(raw: &str) -> Result<NaiveDate, BackendError> {
    let date_part = raw.get(..10).unwrap_or(raw);
    date_part
        .parse::<NaiveDate>()
        .map_err(|_| BackendError::Http(format!("unparseable date from backend: {}", raw)))
}

fn topic_from_dto(dto: KonuDto) -> TopicRow {
    TopicRow {
        id: dto.id,
        name: dto.ad,
        description: dto.aciklama,
        category: dto.ana_baslik.map(|c| CategoryRef {
            id: c.id,
            name: c.ad,
        }),
    }
}

impl Backend for HttpBackend {
    fn mode(&self) -> &'static str {
        "http"
    }

    fn list_people(&self) -> Result<Vec<PersonRow>, BackendError> {
        let rows: Vec<PersonelDto> = self.get("/personel/all")?;
        Ok(rows
            .into_iter()
            .map(|p| PersonRow {
                id: p.id,
                name: format!("{} {}", p.isim, p.soyisim).trim().to_string(),
                role: p.rol,
                title: p.unvan,
            })
            .collect())
    }

    fn list_titles(&self) -> Result<Vec<String>, BackendError> {
        self.get("/personel/unvanlar")
    }

    fn list_categories(&self) -> Result<Vec<CategoryRow>, BackendError> {
        let rows: Vec<AnaBaslikDto> = self.get("/admin/ana-baslik")?;
        Ok(rows
            .into_iter()
            .map(|c| CategoryRow {
                id: c.id,
                name: c.ad,
                description: c.aciklama,
            })
            .collect())
    }

    fn create_category(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CategoryRow, BackendError> {
        self.post(
            "/admin/ana-baslik",
            &json!({ "ad": name, "aciklama": description }),
        )?;
        let rows = self.list_categories()?;
        Self::find_created(rows, |c| c.name == name, "category")
    }

    fn delete_category(&mut self, id: i64) -> Result<(), BackendError> {
        self.delete(self.url(&format!("/admin/ana-baslik/{}", id)))
    }

    fn list_topics(&self) -> Result<Vec<TopicRow>, BackendError> {
        let rows: Vec<KonuDto> = self.get("/admin/konu")?;
        Ok(rows.into_iter().map(topic_from_dto).collect())
    }

    fn create_topic(
        &mut self,
        name: &str,
        description: Option<&str>,
        category_id: i64,
    ) -> Result<TopicRow, BackendError> {
        self.post(
            "/admin/konu",
            &json!({ "ad": name, "aciklama": description, "anaBaslikId": category_id }),
        )?;
        let rows = self.list_topics()?;
        Self::find_created(
            rows,
            |t| t.name == name && t.category.as_ref().map(|c| c.id) == Some(category_id),
            "topic",
        )
    }

    fn delete_topic(&mut self, id: i64) -> Result<(), BackendError> {
        self.delete(self.url(&format!("/admin/konu/{}", id)))
    }

    fn create_question(
        &mut self,
        text: &str,
        weight: f64,
        topic_id: i64,
    ) -> Result<(), BackendError> {
        self.post(
            "/admin/soru",
            &json!({ "metin": text, "agirlik": weight, "konuId": topic_id }),
        )
    }

    fn list_templates(&self) -> Result<Vec<TemplateRow>, BackendError> {
        let rows: Vec<SablonDto> = self.get("/admin/sablon")?;
        Ok(rows
            .into_iter()
            .map(|t| TemplateRow {
                id: t.id,
                name: t.ad,
                description: t.aciklama,
            })
            .collect())
    }

    fn create_template(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<TemplateRow, BackendError> {
        self.post(
            "/admin/sablon",
            &json!({ "ad": name, "aciklama": description }),
        )?;
        let rows = self.list_templates()?;
        Self::find_created(rows, |t| t.name == name, "template")
    }

    fn template_detail(&self, id: i64) -> Result<TemplateDetail, BackendError> {
        let dto: SablonDetayDto = self.get(&format!("/admin/sablon/{}", id))?;
        Ok(TemplateDetail {
            id: dto.id,
            name: dto.ad,
            topics: dto
                .konu_basliklari
                .into_iter()
                .map(|k| TemplateTopic {
                    id: k.id,
                    name: k.ad,
                    questions: k
                        .sorular
                        .into_iter()
                        .map(|s| TemplateQuestion {
                            id: s.id,
                            text: s.metin,
                            weight: s.agirlik,
                        })
                        .collect(),
                })
                .collect(),
        })
    }

    fn attach_topic(&mut self, template_id: i64, topic_id: i64) -> Result<(), BackendError> {
        self.post(
            "/admin/sablon/konu-iliskisi",
            &json!({ "sablonId": template_id, "konuId": topic_id }),
        )
    }

    fn detach_topic(&mut self, template_id: i64, topic_id: i64) -> Result<(), BackendError> {
        self.delete(self.url(&format!("/admin/sablon/{}/konu/{}", template_id, topic_id)))
    }

    fn list_periods(&self) -> Result<Vec<PeriodRow>, BackendError> {
        let rows: Vec<DonemDto> = self.get("/admin/donem")?;
        let mut periods = Vec::with_capacity(rows.len());
        for dto in rows {
            periods.push(PeriodRow {
                id: dto.id,
                name: dto.ad,
                starts_on: parse_wire_date(&dto.baslangic_tarihi)?,
                ends_on: parse_wire_date(&dto.bitis_tarihi)?,
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
        self.post(
            "/admin/donem",
            &json!({
                "ad": name,
                "baslangicTarihi": starts_on.to_string(),
                "bitisTarihi": ends_on.to_string(),
            }),
        )?;
        let rows = self.list_periods()?;
        Self::find_created(rows, |p| p.name == name, "period")
    }

    fn update_period(
        &mut self,
        id: i64,
        name: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<PeriodRow, BackendError> {
        self.put(
            &format!("/admin/donem/{}", id),
            &json!({
                "ad": name,
                "baslangicTarihi": starts_on.to_string(),
                "bitisTarihi": ends_on.to_string(),
            }),
        )?;
        let rows = self.list_periods()?;
        rows.into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound("period not found after update".to_string()))
    }

    fn delete_period(&mut self, id: i64) -> Result<(), BackendError> {
        self.delete(self.url(&format!("/admin/donem/{}", id)))
    }

    fn list_weight_sets(&self) -> Result<Vec<WeightSetRow>, BackendError> {
        let rows: Vec<SablonDto> = self.get("/admin/agirlik-seti")?;
        Ok(rows
            .into_iter()
            .map(|s| WeightSetRow {
                id: s.id,
                name: s.ad,
                description: s.aciklama,
            })
            .collect())
    }

    fn create_weight_set(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<WeightSetRow, BackendError> {
        self.post(
            "/admin/agirlik-seti",
            &json!({ "ad": name, "aciklama": description }),
        )?;
        let rows = self.list_weight_sets()?;
        Self::find_created(rows, |s| s.name == name, "weight set")
    }

    fn delete_weight_set(&mut self, id: i64) -> Result<(), BackendError> {
        self.delete(self.url(&format!("/admin/agirlik-seti/{}", id)))
    }

    fn weight_set_detail(&self, id: i64) -> Result<WeightSetDetail, BackendError> {
        let dto: AgirlikSetiDetayDto = self.get(&format!("/admin/agirlik-seti/{}", id))?;
        Ok(WeightSetDetail {
            id: dto.id,
            name: dto.ad,
            topic_weights: dto
                .konu_agirliklari
                .into_iter()
                .map(|kw| TopicWeight {
                    topic_id: kw.konu_baslik.id,
                    topic_name: kw.konu_baslik.ad,
                    weight: kw.agirlik,
                })
                .collect(),
        })
    }

    fn set_topic_weight(
        &mut self,
        set_id: i64,
        topic_id: i64,
        weight: f64,
    ) -> Result<(), BackendError> {
        self.post(
            "/admin/agirlik-seti/konu-agirligi",
            &json!({ "setId": set_id, "konuId": topic_id, "agirlik": weight }),
        )
    }

    fn list_title_assignments(&self) -> Result<Vec<TitleAssignment>, BackendError> {
        let rows: Vec<UnvanAtamasiDto> = self.get("/admin/agirlik-seti/unvan-atama")?;
        Ok(rows
            .into_iter()
            .map(|a| TitleAssignment {
                title: a.unvan,
                weight_set_id: a.agirlik_seti.id,
                weight_set_name: a.agirlik_seti.ad,
            })
            .collect())
    }

    fn assign_title(&mut self, title: &str, set_id: i64) -> Result<(), BackendError> {
        self.post(
            "/admin/agirlik-seti/unvan-atama",
            &json!({ "unvan": title, "setId": set_id }),
        )
    }

    fn remove_title_assignment(&mut self, title: &str) -> Result<(), BackendError> {
        let url = self.url_with_segment("/admin/agirlik-seti/unvan-atama", title)?;
        self.delete(url)
    }

    fn overall_scores(
        &self,
        period_id: i64,
        template_id: i64,
    ) -> Result<Vec<PersonScoreRow>, BackendError> {
        let rows: Vec<GenelSkorDto> =
            self.get(&format!("/analiz/genel-skoru/{}/{}", period_id, template_id))?;
        Ok(rows
            .into_iter()
            .map(|s| {
                let name = match (s.isim, s.soyisim) {
                    (Some(first), Some(last)) => format!("{} {}", first, last),
                    (Some(first), None) => first,
                    (None, Some(last)) => last,
                    (None, None) => s.personel_id.clone(),
                };
                PersonScoreRow {
                    person_id: s.personel_id,
                    name,
                    score: s.skor,
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
        let dto: SkorDto = self.get(&format!(
            "/analiz/skor/{}/{}/{}",
            person_id, period_id, template_id
        ))?;
        Ok(dto.skor)
    }

    fn submit_answers(&mut self, batch: &AnswerBatch) -> Result<(), BackendError> {
        let answers: Vec<serde_json::Value> = batch
            .answers
            .iter()
            .map(|a| json!({ "soruId": a.question_id, "puan": a.score }))
            .collect();
        self.post(
            "/admin/cevap",
            &json!({
                "donemId": batch.period_id,
                "sablonId": batch.template_id,
                "degerlendirenPersonelId": batch.evaluator_id,
                "degerlendirilenPersonelId": batch.evaluatee_id,
                "cevaplar": answers,
            }),
        )
    }
}
