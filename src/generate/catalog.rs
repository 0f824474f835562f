//! Document kinds, procedures and template path resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A selectable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Contrato de Serviço
    ServiceContract,
    /// Orçamento
    Budget,
    /// Recibo de Pagamento
    PaymentReceipt,
    /// Autorização Tratamento Estético
    TreatmentAuthorization,
    /// Uso de Imagem
    ImageUse,
    /// Termos de Consentimento, one per selected procedure
    ConsentTerms,
    /// Cuidados Pós, one per selected procedure
    Aftercare,
    /// Prontuário
    MedicalRecord,
    /// Anamnese
    Anamnesis,
    /// Receituário
    Prescription,
    /// Atestado Médico
    MedicalCertificate,
}

impl DocumentKind {
    /// All document kinds in display order.
    pub const ALL: [DocumentKind; 11] = [
        DocumentKind::ServiceContract,
        DocumentKind::Budget,
        DocumentKind::PaymentReceipt,
        DocumentKind::TreatmentAuthorization,
        DocumentKind::ImageUse,
        DocumentKind::ConsentTerms,
        DocumentKind::Aftercare,
        DocumentKind::MedicalRecord,
        DocumentKind::Anamnesis,
        DocumentKind::Prescription,
        DocumentKind::MedicalCertificate,
    ];

    /// Human-readable label, also used in output file names.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::ServiceContract => "Contrato de Serviço",
            DocumentKind::Budget => "Orçamento",
            DocumentKind::PaymentReceipt => "Recibo de Pagamento",
            DocumentKind::TreatmentAuthorization => "Autorização Tratamento Estético",
            DocumentKind::ImageUse => "Uso de Imagem",
            DocumentKind::ConsentTerms => "Termos de Consentimento (Específicos)",
            DocumentKind::Aftercare => "Cuidados Pós (Específicos)",
            DocumentKind::MedicalRecord => "Prontuário",
            DocumentKind::Anamnesis => "Anamnese",
            DocumentKind::Prescription => "Receituário",
            DocumentKind::MedicalCertificate => "Atestado Médico",
        }
    }

    /// Short identifier, matching the serde name.
    pub fn key(self) -> &'static str {
        match self {
            DocumentKind::ServiceContract => "service-contract",
            DocumentKind::Budget => "budget",
            DocumentKind::PaymentReceipt => "payment-receipt",
            DocumentKind::TreatmentAuthorization => "treatment-authorization",
            DocumentKind::ImageUse => "image-use",
            DocumentKind::ConsentTerms => "consent-terms",
            DocumentKind::Aftercare => "aftercare",
            DocumentKind::MedicalRecord => "medical-record",
            DocumentKind::Anamnesis => "anamnesis",
            DocumentKind::Prescription => "prescription",
            DocumentKind::MedicalCertificate => "medical-certificate",
        }
    }

    /// Template file name for documents that have a single template.
    ///
    /// Per-procedure documents return `None`; see [`DocumentKind::procedure_prefix`].
    pub fn template_file(self) -> Option<&'static str> {
        match self {
            DocumentKind::ServiceContract => Some("contrato_orofacial.docx"),
            DocumentKind::Budget => Some("orcamento.docx"),
            DocumentKind::PaymentReceipt => Some("recibo.docx"),
            DocumentKind::TreatmentAuthorization => Some("autorizacao_estetico.docx"),
            DocumentKind::ImageUse => Some("autorizacao_imagem.docx"),
            DocumentKind::MedicalRecord => Some("prontuario.docx"),
            DocumentKind::Anamnesis => Some("anamnese.docx"),
            DocumentKind::Prescription => Some("receituario.docx"),
            DocumentKind::MedicalCertificate => Some("atestado.docx"),
            DocumentKind::ConsentTerms | DocumentKind::Aftercare => None,
        }
    }

    /// Template file prefix for per-procedure documents.
    pub fn procedure_prefix(self) -> Option<&'static str> {
        match self {
            DocumentKind::ConsentTerms => Some("termo"),
            DocumentKind::Aftercare => Some("cuidados"),
            _ => None,
        }
    }

    /// Whether one document is produced per selected procedure.
    pub fn is_per_procedure(self) -> bool {
        self.procedure_prefix().is_some()
    }

    /// Whether this document shows the financial fields.
    pub fn is_financial(self) -> bool {
        matches!(
            self,
            DocumentKind::ServiceContract | DocumentKind::Budget | DocumentKind::PaymentReceipt
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        DocumentKind::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s) || k.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Other(format!("Unknown document: {}", s)))
    }
}

/// An aesthetic procedure with its own consent and aftercare templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Procedure {
    /// Toxina Botulínica
    BotulinumToxin,
    /// Preenchimento Facial
    FacialFiller,
    /// Bioestimulador
    Biostimulator,
    /// Fios de Sustentação
    ThreadLift,
    /// Lipo Mecânica de Papada
    MechanicalChinLipo,
    /// Lipo Enzimática de Papada
    EnzymaticChinLipo,
    /// Bichectomia
    BuccalFatRemoval,
    /// Microagulhamento
    Microneedling,
    /// Peeling
    Peeling,
}

impl Procedure {
    /// All procedures in display order.
    pub const ALL: [Procedure; 9] = [
        Procedure::BotulinumToxin,
        Procedure::FacialFiller,
        Procedure::Biostimulator,
        Procedure::ThreadLift,
        Procedure::MechanicalChinLipo,
        Procedure::EnzymaticChinLipo,
        Procedure::BuccalFatRemoval,
        Procedure::Microneedling,
        Procedure::Peeling,
    ];

    /// Human-readable name, as written into documents.
    pub fn name(self) -> &'static str {
        match self {
            Procedure::BotulinumToxin => "Toxina Botulínica",
            Procedure::FacialFiller => "Preenchimento Facial",
            Procedure::Biostimulator => "Bioestimulador",
            Procedure::ThreadLift => "Fios de Sustentação",
            Procedure::MechanicalChinLipo => "Lipo Mecânica de Papada",
            Procedure::EnzymaticChinLipo => "Lipo Enzimática de Papada",
            Procedure::BuccalFatRemoval => "Bichectomia",
            Procedure::Microneedling => "Microagulhamento",
            Procedure::Peeling => "Peeling",
        }
    }

    /// File-name suffix of the procedure's templates.
    pub fn suffix(self) -> &'static str {
        match self {
            Procedure::BotulinumToxin => "toxina",
            Procedure::FacialFiller => "preenchimento",
            Procedure::Biostimulator => "bioestimulador",
            Procedure::ThreadLift => "fios",
            Procedure::MechanicalChinLipo => "lipomecanica",
            Procedure::EnzymaticChinLipo => "lipoenzimatica",
            Procedure::BuccalFatRemoval => "bichectomia",
            Procedure::Microneedling => "microagulhamento",
            Procedure::Peeling => "peeling",
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Procedure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Procedure::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s) || p.suffix().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Other(format!("Unknown procedure: {}", s)))
    }
}

/// One template to fill: where it lives and what to call the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRequest {
    /// Label shown to the user
    pub label: String,

    /// Template path
    pub path: PathBuf,

    /// Output file name
    pub file_name: String,
}

/// Resolves document kinds to template files under a root directory.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    root: PathBuf,
}

impl TemplateCatalog {
    /// Default template directory.
    pub const DEFAULT_ROOT: &'static str = "templates";

    /// Create a catalog rooted at a directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the template directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a single-template document.
    pub fn template_path(&self, kind: DocumentKind) -> Option<PathBuf> {
        kind.template_file().map(|f| self.root.join(f))
    }

    /// Path of a per-procedure template.
    pub fn procedure_template_path(
        &self,
        kind: DocumentKind,
        procedure: Procedure,
    ) -> Option<PathBuf> {
        kind.procedure_prefix()
            .map(|prefix| self.root.join(format!("{}_{}.docx", prefix, procedure.suffix())))
    }

    /// Expand a document selection into concrete template requests.
    ///
    /// Documents come out in catalog order; per-procedure documents expand
    /// once per procedure, in the order the procedures were selected.
    pub fn requests(
        &self,
        documents: &[DocumentKind],
        procedures: &[Procedure],
        patient_name: &str,
    ) -> Vec<TemplateRequest> {
        let mut requests = Vec::new();
        for kind in DocumentKind::ALL {
            if !documents.contains(&kind) {
                continue;
            }
            if let Some(path) = self.template_path(kind) {
                requests.push(TemplateRequest {
                    label: kind.label().to_string(),
                    file_name: output_file_name(kind.label(), patient_name),
                    path,
                });
                continue;
            }
            for &procedure in procedures {
                if let Some(path) = self.procedure_template_path(kind, procedure) {
                    let title = match kind {
                        DocumentKind::ConsentTerms => "Termo",
                        _ => "Cuidados",
                    };
                    requests.push(TemplateRequest {
                        label: format!("{} - {}", title, procedure.name()),
                        file_name: output_file_name(
                            &format!("{}_{}", title, procedure.suffix()),
                            patient_name,
                        ),
                        path,
                    });
                }
            }
        }
        requests
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROOT)
    }
}

/// Build an output file name from a document label and the patient name.
///
/// Path separators in either part are replaced so the name stays a single
/// path component.
pub fn output_file_name(label: &str, patient_name: &str) -> String {
    let clean = |s: &str| s.trim().replace(['/', '\\'], "-");
    format!("{}_{}.docx", clean(label), clean(patient_name))
}
