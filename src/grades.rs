use serde::Serialize;

use crate::discipline::Discipline;
use crate::util::format_number;

/// Projection of a score ratio onto the five-point scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub label: &'static str,
    pub score: u8,
}

pub fn grade_for(ratio: f64, credit: bool) -> Grade {
    let (label, score) = if ratio < 0.2 {
        ("Не зачтено", 1)
    } else if ratio < 0.5 {
        ("Не зачтено", 2)
    } else if credit {
        ("Зачтено", 5)
    } else if ratio < 0.7 {
        ("Удовлетворительно", 3)
    } else if ratio < 0.86 {
        ("Хорошо", 4)
    } else {
        ("Отлично", 5)
    };
    Grade { label, score }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    pub name: String,
    pub sum: f64,
    pub percent: f64,
    pub grade: Grade,
}

impl GradeSummary {
    pub fn for_discipline(discipline: &Discipline) -> Self {
        // only the first attempt of every control point counts
        let sum: f64 = discipline
            .segments
            .first()
            .map(|segment| {
                segment
                    .all_kms
                    .iter()
                    .filter_map(|km| km.balls.first().and_then(|b| b.ball))
                    .filter(|ball| *ball > 0.0)
                    .sum()
            })
            .unwrap_or(0.0);

        let ratio = match discipline.mvb {
            Some(max) if max > 0.0 => sum / max,
            _ => 0.0,
        };

        Self {
            name: discipline.name.trim().to_string(),
            sum,
            percent: ratio * 100.0,
            grade: grade_for(ratio, discipline.is_credit()),
        }
    }

    pub fn sum_text(&self) -> String {
        format_number(self.sum)
    }

    pub fn percent_text(&self) -> String {
        format_number(self.percent)
    }
}

pub fn summarize(disciplines: &[Discipline]) -> Vec<GradeSummary> {
    disciplines.iter().map(GradeSummary::for_discipline).collect()
}
