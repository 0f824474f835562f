//! Form data collected for a generation request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::{DocumentKind, Procedure};
use super::format::{cid_label, days_to_words, format_currency, image_discount_clause, numbered_list};
use crate::fill::PlaceholderMap;

/// Marker for the procedure list as written in the existing templates.
pub const PROCEDURES_MARKER: &str = "{{DESCRIÇÃO_PROCEDIMENTOS}}";

/// ASCII spelling of [`PROCEDURES_MARKER`].
pub const PROCEDURES_MARKER_ASCII: &str = "{{DESCRICAO_PROCEDIMENTOS}}";

/// Documents and procedures chosen for one generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected documents
    pub documents: Vec<DocumentKind>,

    /// Selected procedures, in selection order
    pub procedures: Vec<Procedure>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document and return self.
    pub fn with_document(mut self, kind: DocumentKind) -> Self {
        if !self.documents.contains(&kind) {
            self.documents.push(kind);
        }
        self
    }

    /// Add a procedure and return self.
    pub fn with_procedure(mut self, procedure: Procedure) -> Self {
        if !self.procedures.contains(&procedure) {
            self.procedures.push(procedure);
        }
        self
    }

    /// Whether any selected document shows the financial fields.
    pub fn needs_financials(&self) -> bool {
        self.documents.iter().any(|d| d.is_financial())
    }

    /// Whether the prescription is selected.
    pub fn needs_prescription(&self) -> bool {
        self.documents.contains(&DocumentKind::Prescription)
    }

    /// Whether the medical certificate is selected.
    pub fn needs_leave(&self) -> bool {
        self.documents.contains(&DocumentKind::MedicalCertificate)
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Patient, billing and clinical values entered on the form.
///
/// Fields are free text and are not validated; empty values render as
/// empty text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    /// Full name (required for generation)
    pub name: String,
    /// RG identity number
    pub rg: String,
    /// CPF taxpayer number
    pub cpf: String,
    /// Mobile phone
    pub phone: String,
    /// Postal address
    pub address: String,

    /// Full price before discount
    pub full_amount: f64,
    /// Discount granted
    pub discount: f64,
    /// Payment method description
    pub payment: String,

    /// Prescribed medications
    pub medications: Vec<String>,

    /// Days of leave on the medical certificate
    pub leave_days: i64,
    /// Diagnosis code (CID)
    pub cid: String,
}

impl PatientForm {
    /// Create a form for a patient name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check if the required patient name is present.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Amount due after discount.
    pub fn final_amount(&self) -> f64 {
        self.full_amount - self.discount
    }

    /// Keep only the sections the selected documents display.
    ///
    /// Values typed into a hidden section are not carried into documents.
    pub fn scoped_to(&self, selection: &Selection) -> PatientForm {
        let mut form = self.clone();
        if !selection.needs_financials() {
            form.full_amount = 0.0;
            form.discount = 0.0;
            form.payment.clear();
        }
        if !selection.needs_prescription() {
            form.medications.clear();
        }
        if !selection.needs_leave() {
            form.leave_days = 0;
            form.cid.clear();
        }
        form
    }

    /// Build the full placeholder map for this form.
    ///
    /// Zero leave days means no medical certificate was requested (see
    /// [`PatientForm::scoped_to`]), so `{{DIAS_EXTENSO}}` renders empty
    /// rather than "zero" while `{{DIAS_NUMERO}}` still reads `0`.
    pub fn placeholder_map(&self, procedures: &[Procedure], date: NaiveDate) -> PlaceholderMap {
        let procedure_list = procedures
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ");
        let leave_words = if self.leave_days == 0 {
            String::new()
        } else {
            days_to_words(self.leave_days)
        };

        PlaceholderMap::new()
            .with("{{NOME_PACIENTE}}", self.name.as_str())
            .with("{{RG_PACIENTE}}", self.rg.as_str())
            .with("{{CPF_PACIENTE}}", self.cpf.as_str())
            .with("{{CELULAR_PACIENTE}}", self.phone.as_str())
            .with("{{ENDERECO_PACIENTE}}", self.address.as_str())
            .with("{{DATA_HOJE}}", date.format("%d/%m/%Y").to_string())
            .with(PROCEDURES_MARKER, procedure_list.as_str())
            .with(PROCEDURES_MARKER_ASCII, procedure_list)
            .with("{{VALOR_CHEIO}}", format_currency(self.full_amount))
            .with("{{VALOR_DESCONTO}}", format_currency(self.discount))
            .with("{{VALOR_FINAL}}", format_currency(self.final_amount()))
            .with("{{FORMA_PAGAMENTO}}", self.payment.as_str())
            .with("{{CLAUSULA_IMAGEM}}", image_discount_clause(self.discount))
            .with("{{LISTA_MEDICAMENTOS}}", numbered_list(&self.medications))
            .with("{{DIAS_NUMERO}}", self.leave_days.to_string())
            .with("{{DIAS_EXTENSO}}", leave_words)
            .with("{{CID}}", cid_label(&self.cid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn sample_form() -> PatientForm {
        PatientForm {
            name: "Ana Lima".into(),
            cpf: "123.456.789-00".into(),
            full_amount: 2500.0,
            discount: 300.0,
            payment: "Pix".into(),
            medications: vec!["Dipirona".into(), "Arnica".into()],
            leave_days: 3,
            cid: "L90".into(),
            ..PatientForm::default()
        }
    }

    #[test]
    fn test_placeholder_map_values() {
        let map = sample_form().placeholder_map(
            &[Procedure::BotulinumToxin, Procedure::Peeling],
            date(),
        );

        assert_eq!(map.get("{{NOME_PACIENTE}}"), Some("Ana Lima"));
        assert_eq!(map.get("{{RG_PACIENTE}}"), Some(""));
        assert_eq!(map.get("{{DATA_HOJE}}"), Some("05/03/2024"));
        assert_eq!(map.get(PROCEDURES_MARKER), Some("Toxina Botulínica, Peeling"));
        assert_eq!(map.get(PROCEDURES_MARKER_ASCII), map.get(PROCEDURES_MARKER));
        assert_eq!(map.get("{{VALOR_CHEIO}}"), Some("2.500,00"));
        assert_eq!(map.get("{{VALOR_DESCONTO}}"), Some("300,00"));
        assert_eq!(map.get("{{VALOR_FINAL}}"), Some("2.200,00"));
        assert_eq!(
            map.get("{{CLAUSULA_IMAGEM}}"),
            Some("Desconto de imagem: R$ 300,00.")
        );
        assert_eq!(map.get("{{LISTA_MEDICAMENTOS}}"), Some("1. Dipirona\n2. Arnica\n"));
        assert_eq!(map.get("{{DIAS_NUMERO}}"), Some("3"));
        assert_eq!(map.get("{{DIAS_EXTENSO}}"), Some("três"));
        assert_eq!(map.get("{{CID}}"), Some("CID: L90"));
        assert_eq!(map.len(), 17);
    }

    #[test]
    fn test_scoped_to_clears_hidden_sections() {
        let selection = Selection::new().with_document(DocumentKind::Anamnesis);
        let form = sample_form().scoped_to(&selection);
        let map = form.placeholder_map(&[], date());

        assert_eq!(map.get("{{VALOR_CHEIO}}"), Some("0,00"));
        assert_eq!(map.get("{{CLAUSULA_IMAGEM}}"), Some(""));
        assert_eq!(map.get("{{FORMA_PAGAMENTO}}"), Some(""));
        assert_eq!(map.get("{{LISTA_MEDICAMENTOS}}"), Some(""));
        assert_eq!(map.get("{{DIAS_NUMERO}}"), Some("0"));
        assert_eq!(map.get("{{DIAS_EXTENSO}}"), Some(""));
        assert_eq!(map.get("{{CID}}"), Some(""));
        assert_eq!(form.name, "Ana Lima");
    }

    #[test]
    fn test_scoped_to_keeps_visible_sections() {
        let selection = Selection::new()
            .with_document(DocumentKind::PaymentReceipt)
            .with_document(DocumentKind::MedicalCertificate);
        let form = sample_form().scoped_to(&selection);

        assert_eq!(form.discount, 300.0);
        assert_eq!(form.leave_days, 3);
        assert!(form.medications.is_empty());
    }

    #[test]
    fn test_no_discount_no_clause() {
        let form = PatientForm {
            full_amount: 800.0,
            ..PatientForm::new("Ana")
        };
        let map = form.placeholder_map(&[], date());
        assert_eq!(map.get("{{CLAUSULA_IMAGEM}}"), Some(""));
        assert_eq!(map.get("{{VALOR_FINAL}}"), Some("800,00"));
    }

    #[test]
    fn test_has_name() {
        assert!(!PatientForm::default().has_name());
        assert!(!PatientForm::new("   ").has_name());
        assert!(PatientForm::new("Ana").has_name());
    }

    #[test]
    fn test_selection_flags() {
        let selection = Selection::new()
            .with_document(DocumentKind::Budget)
            .with_document(DocumentKind::Budget);
        assert_eq!(selection.documents.len(), 1);
        assert!(selection.needs_financials());
        assert!(!selection.needs_prescription());
        assert!(!selection.needs_leave());
    }
}
