//! Forms for adding, editing and bulk uploading companies.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::{
    domain::{
        company::{CompanyDetails, NewCompany, UpdateCompany},
        types::HubId,
    },
    forms::FormError,
};

/// Form used both by the "add company" modal and the edit page.
#[derive(Debug, Deserialize, Validate)]
pub struct CompanyForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

pub struct CompanyPayload {
    pub details: CompanyDetails,
}

impl TryFrom<CompanyForm> for CompanyPayload {
    type Error = FormError;

    fn try_from(form: CompanyForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let details = CompanyDetails::try_new(
            form.name,
            form.email,
            form.phone,
            form.address,
            form.industry,
            form.website,
        )?;
        Ok(Self { details })
    }
}

impl CompanyPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewCompany {
        NewCompany::new(hub_id, self.details)
    }

    pub fn into_update(self) -> UpdateCompany {
        UpdateCompany {
            details: self.details,
        }
    }
}

/// Multipart upload of a companies CSV file.
#[derive(MultipartForm)]
pub struct UploadCompaniesForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadCompaniesForm {
    /// Parses the uploaded file into new companies of `hub_id`.
    pub fn parse(&self, hub_id: HubId) -> Result<Vec<NewCompany>, FormError> {
        let file = std::fs::File::open(self.csv.file.path())
            .map_err(|err| FormError::Csv(err.to_string()))?;
        parse_companies_csv(file, hub_id)
    }
}

const CSV_COLUMNS: [&str; 6] = ["name", "email", "phone", "address", "industry", "website"];

/// Reads `name,email,phone,address,industry,website` rows; other columns are ignored.
///
/// Row numbers in errors are file line numbers, the header being line 1.
pub fn parse_companies_csv<R: Read>(reader: R, hub_id: HubId) -> Result<Vec<NewCompany>, FormError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|err| FormError::Csv(err.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect::<Vec<String>>();

    let positions: Vec<Option<usize>> = CSV_COLUMNS
        .iter()
        .map(|column| headers.iter().position(|h| h == column))
        .collect();
    if positions[0].is_none() {
        return Err(FormError::Csv("name列がありません".to_string()));
    }

    let mut companies = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result.map_err(|err| FormError::Csv(err.to_string()))?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);

        let field = |column: usize| -> Option<String> {
            positions[column]
                .and_then(|i| record.get(i))
                .map(str::to_string)
        };

        let name = field(0).unwrap_or_default();
        if name.is_empty() {
            return Err(FormError::CsvRow {
                row,
                message: FormError::Required.to_string(),
            });
        }

        let details = CompanyDetails::try_new(name, field(1), field(2), field(3), field(4), field(5))
            .map_err(|err| FormError::CsvRow {
                row,
                message: FormError::from(err).to_string(),
            })?;
        companies.push(NewCompany::new(hub_id, details));
    }

    Ok(companies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> HubId {
        HubId::new(1).expect("valid hub")
    }

    #[test]
    fn form_requires_a_name() {
        let form = CompanyForm {
            name: "   ".to_string(),
            email: None,
            phone: None,
            address: None,
            industry: None,
            website: None,
        };
        assert!(matches!(
            CompanyPayload::try_from(form),
            Err(FormError::Required)
        ));
    }

    #[test]
    fn form_lowercases_email() {
        let form = CompanyForm {
            name: "Acme".to_string(),
            email: Some("Info@Acme.JP".to_string()),
            phone: Some(String::new()),
            address: None,
            industry: Some("Retail".to_string()),
            website: None,
        };
        let company = CompanyPayload::try_from(form)
            .expect("valid form")
            .into_domain(hub());
        assert_eq!(
            company.details.email.as_ref().map(|e| e.as_str()),
            Some("info@acme.jp")
        );
        assert_eq!(company.details.phone, None);
    }

    #[test]
    fn csv_ignores_unknown_columns_and_reorders() {
        let data = "Email,Name,Notes,industry\nsales@acme.jp,Acme,vip,Retail\n,Blue Ocean,,\n";
        let companies = parse_companies_csv(data.as_bytes(), hub()).expect("valid csv");
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].details.name.as_str(), "Acme");
        assert_eq!(companies[0].details.industry.as_deref(), Some("Retail"));
        assert_eq!(companies[1].details.email, None);
    }

    #[test]
    fn csv_reports_line_of_nameless_row() {
        let data = "name,email\nAcme,a@acme.jp\n,b@blue.jp\n";
        assert_eq!(
            parse_companies_csv(data.as_bytes(), hub()),
            Err(FormError::CsvRow {
                row: 3,
                message: FormError::Required.to_string()
            })
        );
    }

    #[test]
    fn csv_without_name_column_is_rejected() {
        let data = "email,phone\na@acme.jp,\n";
        assert!(matches!(
            parse_companies_csv(data.as_bytes(), hub()),
            Err(FormError::Csv(_))
        ));
    }

    #[test]
    fn csv_reports_invalid_values_with_row() {
        let data = "name,email\nAcme,not-an-email\n";
        assert_eq!(
            parse_companies_csv(data.as_bytes(), hub()),
            Err(FormError::CsvRow {
                row: 2,
                message: FormError::InvalidEmail.to_string()
            })
        );
    }
}
