//! Integration tests for batch generation and sessions.

mod common;

use std::path::Path;

use chrono::NaiveDate;
use common::{build_docx, paragraph};
use docfill::{
    parse_bytes, DocumentKind, Error, Generator, PatientForm, Procedure, Selection, Session,
    StaticCredentials, TemplateCatalog,
};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

fn write_template(dir: &Path, file: &str, lines: &[&str]) {
    let body: String = lines.iter().map(|l| paragraph(l)).collect();
    std::fs::write(dir.join(file), build_docx(&body)).unwrap();
}

fn form() -> PatientForm {
    PatientForm {
        name: "Ana Lima".into(),
        cpf: "123.456.789-00".into(),
        full_amount: 1500.0,
        discount: 250.5,
        payment: "Pix".into(),
        medications: vec!["Dipirona".into()],
        leave_days: 2,
        cid: "L90".into(),
        ..PatientForm::default()
    }
}

#[test]
fn test_generate_with_missing_templates() {
    let dir = tempfile::tempdir().unwrap();
    write_template(
        dir.path(),
        "recibo.docx",
        &[
            "Recebi de {{NOME_PACIENTE}} a quantia de R$ {{VALOR_FINAL}}.",
            "{{CLAUSULA_IMAGEM}}",
            "Data: {{DATA_HOJE}}",
        ],
    );
    write_template(
        dir.path(),
        "termo_peeling.docx",
        &["Eu, {{NOME_PACIENTE}}, autorizo: {{DESCRIÇÃO_PROCEDIMENTOS}}"],
    );

    let generator = Generator::new(TemplateCatalog::new(dir.path()));
    let selection = Selection::new()
        .with_document(DocumentKind::ConsentTerms)
        .with_document(DocumentKind::PaymentReceipt)
        .with_document(DocumentKind::MedicalCertificate)
        .with_procedure(Procedure::Peeling)
        .with_procedure(Procedure::BotulinumToxin);

    let report = generator.generate(&form(), &selection, date()).unwrap();

    let names: Vec<_> = report.documents.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Recibo de Pagamento_Ana Lima.docx", "Termo_peeling_Ana Lima.docx"]
    );

    let missing: Vec<_> = report.missing.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(missing, vec!["Termo - Toxina Botulínica", "Atestado Médico"]);
    assert!(report.missing[1].path.ends_with("atestado.docx"));

    let receipt = parse_bytes(&report.documents[0].bytes).unwrap();
    assert_eq!(
        receipt.plain_text(),
        "Recebi de Ana Lima a quantia de R$ 1.249,50.\n\
         Desconto de imagem: R$ 250,50.\n\
         Data: 05/03/2024"
    );

    let terms = parse_bytes(&report.documents[1].bytes).unwrap();
    assert_eq!(
        terms.plain_text(),
        "Eu, Ana Lima, autorizo: Peeling, Toxina Botulínica"
    );
}

#[test]
fn test_hidden_sections_not_rendered() {
    let dir = tempfile::tempdir().unwrap();
    write_template(
        dir.path(),
        "anamnese.docx",
        &["{{NOME_PACIENTE}}|{{VALOR_CHEIO}}|{{LISTA_MEDICAMENTOS}}|{{CID}}"],
    );

    let generator = Generator::new(TemplateCatalog::new(dir.path()));
    let selection = Selection::new().with_document(DocumentKind::Anamnesis);
    let report = generator.generate(&form(), &selection, date()).unwrap();

    assert!(report.is_complete());
    let doc = parse_bytes(&report.documents[0].bytes).unwrap();
    assert_eq!(doc.plain_text(), "Ana Lima|0,00||");
}

#[test]
fn test_certificate_values() {
    let dir = tempfile::tempdir().unwrap();
    write_template(
        dir.path(),
        "atestado.docx",
        &["Afastamento de {{DIAS_NUMERO}} ({{DIAS_EXTENSO}}) dias. {{CID}}"],
    );

    let generator = Generator::new(TemplateCatalog::new(dir.path()));
    let selection = Selection::new().with_document(DocumentKind::MedicalCertificate);
    let report = generator.generate(&form(), &selection, date()).unwrap();

    let doc = parse_bytes(&report.documents[0].bytes).unwrap();
    assert_eq!(doc.plain_text(), "Afastamento de 2 (dois) dias. CID: L90");
}

#[test]
fn test_blank_name_generates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_template(dir.path(), "recibo.docx", &["{{NOME_PACIENTE}}"]);

    let generator = Generator::new(TemplateCatalog::new(dir.path()));
    let selection = Selection::new().with_document(DocumentKind::PaymentReceipt);
    let form = PatientForm {
        name: "   ".into(),
        ..form()
    };

    let result = generator.generate(&form, &selection, date());
    match result {
        Err(e) => {
            assert!(matches!(e, Error::MissingPatientName));
            assert_eq!(e.to_string(), "Patient name is required");
        }
        Ok(_) => panic!("blank name must be refused"),
    }
}

#[test]
fn test_malformed_template_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("orcamento.docx"), b"not a zip").unwrap();

    let generator = Generator::new(TemplateCatalog::new(dir.path()));
    let selection = Selection::new().with_document(DocumentKind::Budget);

    assert!(generator.generate(&form(), &selection, date()).is_err());
}

#[test]
fn test_session_with_credentials_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, r#"{"paula": "segredo"}"#).unwrap();

    let credentials = StaticCredentials::from_file(&path).unwrap();
    let mut session = Session::new();

    assert!(matches!(
        session.login(&credentials, "paula", "outra"),
        Err(Error::AccessDenied)
    ));
    session.login(&credentials, "paula", "segredo").unwrap();
    session.add_medication("Dipirona 1g");
    session.add_medication("Arnica gel");
    assert_eq!(session.medication_text(), "1. Dipirona 1g\n2. Arnica gel\n");

    session.logout();
    assert!(!session.is_authenticated());
    assert!(session.medications().is_empty());
}
