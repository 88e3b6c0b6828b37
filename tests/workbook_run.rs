use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use class_staffing::config::Config;
use class_staffing::grid::StyleSnapshot;
use class_staffing::schedule::register_candidate;
use class_staffing::staffing::{run_all, run_date};
use class_staffing::workbook::Workbook;

fn workbook_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("class-staffing-it-{}-{}", test, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();

    fs::write(
        dir.join("日.csv"),
        "日,小1,小2,小3,小4,小5,小6\n\
         時限,,,,,,\n\
         1,,,3M,,5J,\n\
         2,1J,なし,,,,\n\
         3,,,,,,6S\n",
    )
    .unwrap();
    fs::write(dir.join("Priority.csv"), "3M,5J,6S,1J\nA,A,C,\n,B,,\n").unwrap();
    fs::write(dir.join("8-4.csv"), "8/4,A,B,C,D\n,◯,◯,◯,×\n,,,,old\n").unwrap();
    // 2024-08-05 is a Monday and the workbook has no 月 template
    fs::write(dir.join("8-5.csv"), "8/5,A,B\n,◯,◯\n").unwrap();
    fs::write(dir.join("Main.csv"), "dashboard\n").unwrap();
    fs::write(
        dir.join("styles.json"),
        r##"{"日": [{"row": 3, "col": 4, "style": {"background": "#d9ead3", "font_bold": true}}]}"##,
    )
    .unwrap();
    dir
}

#[test]
fn batch_run_updates_schedule_files() {
    let dir = workbook_dir("batch");
    let mut workbook = Workbook::open(&dir).unwrap();

    let summary = run_all(&mut workbook, &Config::default(), 2024).unwrap();

    assert_eq!(summary.total_sheets, 2);
    assert_eq!(summary.processed_count, 1);
    assert_eq!(summary.total_lessons, 4);
    assert_eq!(summary.total_assigned, 3);
    assert_eq!(summary.total_unassigned, 1);
    assert_eq!(summary.unassigned_details[0].lesson_code, "1J");
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].sheet, "8-5");

    let reopened = Workbook::open(&dir).unwrap();
    let sheet = reopened.sheet("8-4").unwrap();
    // 6S ranks first and takes C, 5J takes A, 3M falls back to B
    assert_eq!(sheet.value(3, 2), "5J");
    assert_eq!(sheet.value(3, 3), "3M");
    assert_eq!(sheet.value(5, 4), "6S");
    assert_eq!(sheet.value(3, 5), "");
    assert_eq!(sheet.value(4, 2), "");
    assert_eq!(
        sheet.cell(3, 3).and_then(|c| c.style.clone()),
        Some(StyleSnapshot {
            background: Some("#d9ead3".to_string()),
            font_bold: Some(true),
            ..StyleSnapshot::default()
        })
    );
    // the failed date is left as it was
    assert_eq!(fs::read_to_string(dir.join("8-5.csv")).unwrap(), "8/5,A,B\n,◯,◯\n");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn registering_a_teacher_changes_the_next_run() {
    let dir = workbook_dir("register");
    let config = Config::default();
    let mut workbook = Workbook::open(&dir).unwrap();

    let table = workbook.sheet_mut("Priority").unwrap();
    assert!(register_candidate("1J".parse().unwrap(), "D", table, &config.priority).unwrap());
    assert!(!register_candidate("1J".parse().unwrap(), "D", table, &config.priority).unwrap());
    workbook.save_sheet("Priority").unwrap();

    let mut workbook = Workbook::open(&dir).unwrap();
    assert_eq!(workbook.sheet("Priority").unwrap().value(2, 4), "D");

    // D is marked × so 1J falls back to the first free teacher outside its list
    let date = NaiveDate::from_ymd_opt(2024, 8, 4).unwrap();
    let run = run_date(&mut workbook, &config, date).unwrap();
    assert_eq!(run.summary.unassigned, 0);
    assert_eq!(workbook.sheet("8-4").unwrap().value(4, 2), "1J");

    let table = workbook.sheet_mut("Priority").unwrap();
    assert!(register_candidate("1J".parse().unwrap(), "B", table, &config.priority).unwrap());
    assert_eq!(table.value(3, 4), "B");
    run_date(&mut workbook, &config, date).unwrap();
    let sheet = workbook.sheet("8-4").unwrap();
    assert_eq!(sheet.value(4, 3), "1J");
    assert_eq!(sheet.value(4, 2), "");

    fs::remove_dir_all(&dir).unwrap();
}
