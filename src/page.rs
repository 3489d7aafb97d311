use scraper::{Html, Selector};

use crate::discipline::DisciplineFeed;
use crate::error::{Result, ScheduleError};
use crate::lesson::WeekVariant;

/// What the student page tells about the current state of the term
#[derive(Debug, Clone, PartialEq)]
pub struct StudentPage {
    pub group: String,
    pub is_exam_session: bool,
    pub week: Option<WeekVariant>,
    /// Contents of the `#forang` element: the discipline list as JSON
    pub embedded_json: Option<String>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScheduleError::Feed(format!("bad selector '{}': {:?}", css, e)))
}

impl StudentPage {
    pub fn parse(html: &str) -> Result<Self> {
        let doc = Html::parse_document(html);

        let group = doc
            .select(&selector(r#"select[name="student_id"] option[selected]"#)?)
            .next()
            .and_then(|option| {
                let text = option.text().collect::<String>();
                text.split_whitespace().next().map(str::to_string)
            })
            .ok_or_else(|| ScheduleError::Feed("no selected group on the student page".to_string()))?;

        let is_exam_session = doc
            .select(&selector("a")?)
            .any(|link| link.text().collect::<String>().trim() == "Сессия");

        let week = doc
            .select(&selector(".small")?)
            .next()
            .and_then(|el| find_week_label(&el.text().collect::<Vec<_>>().join(" ")));

        let embedded_json = doc
            .select(&selector("#forang")?)
            .next()
            .map(|el| el.text().collect::<String>())
            .filter(|json| !json.trim().is_empty());

        Ok(Self {
            group,
            is_exam_session,
            week,
            embedded_json,
        })
    }

    pub fn disciplines(&self) -> Result<DisciplineFeed> {
        let json = self
            .embedded_json
            .as_deref()
            .ok_or_else(|| ScheduleError::Feed("student page has no discipline data".to_string()))?;
        Ok(serde_json::from_str(json)?)
    }
}

/// Find a "<n> числитель|знаменатель" pair anywhere in the text
fn find_week_label(text: &str) -> Option<WeekVariant> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .windows(2)
        .find_map(|pair| format!("{} {}", pair[0], pair[1]).parse().ok())
}
