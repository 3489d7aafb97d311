use orioks_schedule::discipline::DisciplineFeed;
use orioks_schedule::grades::{grade_for, summarize};

#[test]
fn grade_boundaries() {
    let score = |ratio: f64| grade_for(ratio, false).score;

    assert_eq!(score(0.0), 1);
    assert_eq!(score(0.19), 1);
    assert_eq!(score(0.2), 2);
    assert_eq!(score(0.49), 2);
    assert_eq!(score(0.5), 3);
    assert_eq!(score(0.69), 3);
    assert_eq!(score(0.7), 4);
    assert_eq!(score(0.85), 4);
    assert_eq!(score(0.86), 5);
    assert_eq!(grade_for(0.86, false).label, "Отлично");
}

#[test]
fn credit_is_pass_or_fail() {
    assert_eq!(grade_for(0.3, true).label, "Не зачтено");
    assert_eq!(grade_for(0.5, true).label, "Зачтено");
    assert_eq!(grade_for(0.95, true).score, 5);
}

#[test]
fn summary_counts_first_attempts_only() {
    let feed: DisciplineFeed = serde_json::from_value(serde_json::json!({
        "dises": [
            {
                "name": "Математический анализ ",
                "formControl": { "name": "Экзамен" },
                "mvb": 100,
                "segments": [{
                    "allKms": [
                        { "balls": [{ "ball": 20.5 }, { "ball": 30 }] },
                        { "balls": [{ "ball": -1 }] },
                        { "balls": [{ "ball": null }] },
                        { "balls": [] },
                        { "balls": [{ "ball": 30 }] }
                    ]
                }]
            },
            {
                "name": "Физическая культура",
                "formControl": { "name": "Зачёт" },
                "mvb": 40,
                "segments": [{ "allKms": [{ "balls": [{ "ball": 25 }] }] }]
            },
            {
                "name": "Новая дисциплина",
                "formControl": { "name": "Экзамен" },
                "mvb": 0,
                "segments": [{ "allKms": [{ "balls": [{ "ball": 10 }] }] }]
            }
        ]
    }))
    .unwrap();

    let summaries = summarize(&feed.dises);

    let math = &summaries[0];
    assert_eq!(math.name, "Математический анализ");
    assert_eq!(math.sum_text(), "50.5");
    assert_eq!(math.percent_text(), "50.5");
    assert_eq!(math.grade.label, "Удовлетворительно");

    let pe = &summaries[1];
    assert_eq!(pe.sum_text(), "25");
    assert_eq!(pe.percent_text(), "62.5");
    assert_eq!(pe.grade.label, "Зачтено");

    let fresh = &summaries[2];
    assert_eq!(fresh.sum_text(), "10");
    assert_eq!(fresh.percent_text(), "0");
    assert_eq!(fresh.grade.score, 1);
}
