//! End-to-end tests driving the `smx` binary against temporary files.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const JD: &str = "Looking for 3 years experience in python and sql";

fn smx_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_smx"))
}

fn minimal_docx_with_text(text: &str) -> Vec<u8> {
    use std::io::Write;
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            text
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

/// One-page PDF with `text` drawn in a standard Type1 font.
fn pdf_with_text(text: &str) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("smx.toml"),
        r#"[weights]
similarity = 20
skill = 50
experience = 30

[skills]
vocabulary = ["python", "sql", "react", "java"]
"#,
    )
    .unwrap();

    let cvs = root.join("cvs");
    fs::create_dir_all(&cvs).unwrap();
    fs::write(
        cvs.join("alice.txt"),
        "I have 4 years experience in python, sql and react",
    )
    .unwrap();
    fs::write(cvs.join("bob.txt"), "Gardener with 10 years in landscaping").unwrap();
    fs::write(
        cvs.join("carol.docx"),
        minimal_docx_with_text("Java developer, 2 years of sql"),
    )
    .unwrap();
    fs::write(root.join("jd.txt"), JD).unwrap();

    (tmp, config_dir.join("smx.toml"))
}

fn run_smx(config_path: &Path, args: &[&str]) -> (String, String, Option<i32>) {
    let binary = smx_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run smx binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

fn root_of(config_path: &Path) -> PathBuf {
    config_path.parent().unwrap().parent().unwrap().to_path_buf()
}

fn data_lines(table: &str) -> Vec<&str> {
    table.lines().skip(2).collect()
}

#[test]
fn test_rank_directory_prints_sorted_table() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd",
            root.join("jd.txt").to_str().unwrap(),
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
            "--progress",
            "off",
        ],
    );
    assert_eq!(code, Some(0), "rank failed: {}", stderr);
    assert!(stdout.starts_with("#  Candidate Name"), "{}", stdout);
    let rows = data_lines(&stdout);
    assert_eq!(rows.len(), 3, "{}", stdout);
    assert!(rows[0].starts_with("1  alice.txt"), "{}", stdout);
    assert!(rows[0].contains("python, sql"));
    assert!(rows[0].trim_end().ends_with("93.39"), "{}", rows[0]);
    assert!(rows[2].starts_with("3  bob.txt"), "{}", stdout);
    assert!(rows[2].contains("None"));
}

#[test]
fn test_rank_json_output() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            root.join("cvs").join("alice.txt").to_str().unwrap(),
            "--json",
        ],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let row = &value["rows"][0];
    assert_eq!(row["rank"], 1);
    assert_eq!(row["status"], "scored");
    assert_eq!(row["skill_match_score"], 100.0);
    assert_eq!(row["experience_years"], 4.0);
    assert_eq!(row["experience_match_score"], 100.0);
    assert_eq!(row["matched_skills"], serde_json::json!(["python", "sql"]));
}

#[test]
fn test_jd_file_overrides_text() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    // Pasted text asks for java; the file asks for python and sql.
    let (stdout, _, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            "java only",
            "--jd",
            root.join("jd.txt").to_str().unwrap(),
            root.join("cvs").join("alice.txt").to_str().unwrap(),
            "--json",
        ],
    );
    assert_eq!(code, Some(0));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value["rows"][0]["matched_skills"],
        serde_json::json!(["python", "sql"])
    );
}

#[test]
fn test_weights_must_sum_to_100() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
            "--skill-weight",
            "60",
        ],
    );
    assert_eq!(code, Some(2));
    assert!(stdout.is_empty());
    assert!(stderr.contains("total weight equals 100%"), "{}", stderr);
}

#[test]
fn test_negative_weight_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
            "--similarity-weight",
            "-100",
            "--skill-weight",
            "100",
            "--experience-weight",
            "100",
        ],
    );
    assert_eq!(code, Some(2), "{}", stderr);
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("similarity weight must be a non-negative number"),
        "{}",
        stderr
    );
}

#[test]
fn test_nan_weight_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
            "--skill-weight",
            "NaN",
        ],
    );
    assert_eq!(code, Some(2), "{}", stderr);
    assert!(stdout.is_empty());
    assert!(stderr.contains("skill weight must be a non-negative number"), "{}", stderr);
}

#[test]
fn test_weight_overrides_applied() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            root.join("cvs").join("alice.txt").to_str().unwrap(),
            "--similarity-weight",
            "0",
            "--skill-weight",
            "100",
            "--experience-weight",
            "0",
            "--json",
        ],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["rows"][0]["final_score"], 100.0);
}

#[test]
fn test_empty_job_description_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (_, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            "   ",
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
        ],
    );
    assert_eq!(code, Some(2));
    assert!(stderr.contains("job description"), "{}", stderr);
}

#[test]
fn test_no_resumes_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, code) = run_smx(&config_path, &["rank", "--jd-text", JD]);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("at least one resume"), "{}", stderr);
}

#[test]
fn test_pdf_resume_is_scored() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let pdf = root.join("dave.pdf");
    fs::write(&pdf, pdf_with_text("Python developer with 5 years of sql")).unwrap();

    let (stdout, stderr, code) = run_smx(
        &config_path,
        &["rank", "--jd-text", JD, pdf.to_str().unwrap(), "--json"],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let row = &value["rows"][0];
    assert_eq!(row["status"], "scored", "{}", stdout);
    assert_eq!(row["candidate_name"], "dave");
    assert_eq!(row["resume_file"], "dave.pdf");
    assert_eq!(row["matched_skills"], serde_json::json!(["python", "sql"]));
    assert_eq!(row["skill_match_score"], 100.0);
    assert_eq!(row["experience_years"], 5.0);
    assert_eq!(row["experience_match_score"], 100.0);
    assert!(row["similarity_score"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_inspect_pdf() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let pdf = root.join("dave.pdf");
    fs::write(&pdf, pdf_with_text("Python developer with 5 years of sql")).unwrap();

    let (stdout, stderr, code) = run_smx(&config_path, &["inspect", pdf.to_str().unwrap()]);
    assert_eq!(code, Some(0), "{}", stderr);
    assert!(stdout.contains("kind: pdf"), "{}", stdout);
    assert!(stdout.contains("skills: python, sql"), "{}", stdout);
    assert!(stdout.contains("experience (years): 5"), "{}", stdout);
}

#[test]
fn test_corrupt_pdf_isolated() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    fs::write(root.join("cvs").join("broken.pdf"), b"not a valid pdf").unwrap();
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
            "--progress",
            "off",
        ],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    let rows = data_lines(&stdout);
    assert_eq!(rows.len(), 4);
    assert!(rows[3].starts_with("4  broken"), "{}", stdout);
    assert!(rows[3].contains("ERROR: PDF extraction failed"));
    assert!(stderr.contains("1 of 4 resumes could not be read"), "{}", stderr);
}

#[test]
fn test_corrupt_pdf_fail_fast() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    fs::write(root.join("cvs").join("broken.pdf"), b"not a valid pdf").unwrap();
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
            "--fail-fast",
        ],
    );
    assert_ne!(code, Some(0));
    assert!(stdout.is_empty());
    assert!(stderr.contains("broken.pdf"), "{}", stderr);
}

#[test]
fn test_xlsx_export() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let out = root.join("out").join("ranked_resumes.xlsx");
    let (_, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            "--resumes-dir",
            root.join("cvs").to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    assert!(stderr.contains("Exported 3 rows"), "{}", stderr);

    let bytes = fs::read(&out).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut workbook = String::new();
    archive
        .by_name("xl/workbook.xml")
        .unwrap()
        .read_to_string(&mut workbook)
        .unwrap();
    assert!(workbook.contains("Ranked Resumes"));
    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut sheet)
        .unwrap();
    assert_eq!(sheet.matches("<row ").count(), 4);
    assert!(sheet.contains("alice.txt"));
}

#[test]
fn test_csv_export_by_flag() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let out = root.join("ranked.out");
    let (_, stderr, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            JD,
            root.join("cvs").join("bob.txt").to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--format",
            "csv",
        ],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Candidate Name,Resume File,"));
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_skills_override_flag() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, _, code) = run_smx(
        &config_path,
        &[
            "rank",
            "--jd-text",
            "landscaping and gardener roles",
            root.join("cvs").join("bob.txt").to_str().unwrap(),
            "--skills",
            "landscaping,Gardener",
            "--json",
        ],
    );
    assert_eq!(code, Some(0));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value["rows"][0]["matched_skills"],
        serde_json::json!(["gardener", "landscaping"])
    );
}

#[test]
fn test_inspect_reports_skills_and_experience() {
    let (_tmp, config_path) = setup_test_env();
    let root = root_of(&config_path);
    let (stdout, stderr, code) = run_smx(
        &config_path,
        &["inspect", root.join("cvs").join("carol.docx").to_str().unwrap()],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    assert!(stdout.contains("kind: docx"));
    assert!(stdout.contains("skills: java, sql"), "{}", stdout);
    assert!(stdout.contains("experience (years): 2"), "{}", stdout);
}

#[test]
fn test_skills_lists_vocabulary() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, code) = run_smx(&config_path, &["skills"]);
    assert_eq!(code, Some(0));
    let terms: Vec<&str> = stdout.lines().collect();
    assert_eq!(terms, vec!["java", "python", "react", "sql"]);
}

#[test]
fn test_init_writes_config_and_refuses_overwrite() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("conf").join("smx.toml");
    let (stdout, _, code) = run_smx(&path, &["init"]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Wrote"));
    assert!(fs::read_to_string(&path).unwrap().contains("[weights]"));

    let (_, stderr, code) = run_smx(&path, &["init"]);
    assert_ne!(code, Some(0));
    assert!(stderr.contains("already exists"));

    let (_, _, code) = run_smx(&path, &["init", "--force"]);
    assert_eq!(code, Some(0));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let cv = tmp.path().join("dana.txt");
    fs::write(&cv, "5 years of docker and aws").unwrap();
    let (stdout, stderr, code) = run_smx(
        &tmp.path().join("absent.toml"),
        &[
            "rank",
            "--jd-text",
            "docker aws engineer, 5 years",
            cv.to_str().unwrap(),
            "--json",
        ],
    );
    assert_eq!(code, Some(0), "{}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value["rows"][0]["matched_skills"],
        serde_json::json!(["aws", "docker"])
    );
}
