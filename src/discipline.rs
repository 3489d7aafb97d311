use serde::{Deserialize, Serialize};

pub const CONTROL_FORM_EXAM: &str = "Экзамен";
pub const CONTROL_FORM_CREDIT: &str = "Зачёт";

/// Discipline list embedded in the student page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisciplineFeed {
    #[serde(default)]
    pub dises: Vec<Discipline>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Discipline {
    pub name: String,
    #[serde(rename = "formControl", default)]
    pub form_control: FormControl,
    #[serde(default)]
    pub preps: Vec<Teacher>,

    #[serde(default)]
    pub date_cons: Option<String>,
    #[serde(default)]
    pub time_cons: Option<String>,
    #[serde(default)]
    pub room_cons: Option<String>,
    #[serde(default)]
    pub date_exam: Option<String>,
    #[serde(default)]
    pub time_exam: Option<String>,
    #[serde(default)]
    pub room_exam: Option<String>,

    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Maximum achievable score
    #[serde(default)]
    pub mvb: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormControl {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "allKms", default)]
    pub all_kms: Vec<ControlPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlPoint {
    #[serde(default)]
    pub balls: Vec<Ball>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ball {
    #[serde(default)]
    pub ball: Option<f64>,
}

impl Discipline {
    pub fn is_examined(&self) -> bool {
        self.form_control.name.trim() == CONTROL_FORM_EXAM
    }

    pub fn is_credit(&self) -> bool {
        self.form_control.name.trim() == CONTROL_FORM_CREDIT
    }

    /// Discipline name followed by one "► teacher" line per teacher
    pub fn label(&self) -> String {
        let mut label = self.name.trim().to_string();
        for teacher in &self.preps {
            label.push_str(&format!("\n► {}", teacher.name.trim()));
        }
        label
    }
}
