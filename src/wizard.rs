//! Three-step entry wizard: overview → select country/topic → fill form
//!
//! The wizard owns required-field validation. A country is checked as a sheet
//! name when chosen and against the workbook's sheets when confirmed, so a
//! counted country can always get its detail record. Confirming a selection
//! bumps the country ledger; submitting the form appends the detail record. A failed
//! transition leaves the state unchanged so the caller can correct and retry.

use crate::dashboard::Dashboard;
use crate::detail::validate_country_sheet;
use crate::error::{TallyError, TallyResult};
use crate::types::{DetailPayload, DetailRecord};
use serde::{Deserialize, Serialize};

/// Form fields entered on the detail step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub company_name: String,
    pub contact_name: String,
    pub ident_number: String,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    Overview,
    Selecting {
        country: Option<String>,
        topic: Option<String>,
    },
    Form {
        country: String,
        topic: String,
        employee: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// Begin a new entry from the overview
    Start,
    ChooseCountry(String),
    ChooseTopic(String),
    /// Accept the country/topic selection and move to the form
    Confirm,
    ChooseEmployee(String),
    Submit(FormInput),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    /// State changed, nothing persisted
    Moved,
    /// The ledger total for `country` is now `total`
    CountryCounted { country: String, total: u64 },
    Saved(DetailRecord),
    Discarded,
}

/// Check the required form fields: a chosen employee and a non-blank company name
pub fn validate_submission(employee: Option<&str>, input: &FormInput) -> TallyResult<()> {
    if input.company_name.trim().is_empty() {
        return Err(TallyError::Validation(
            "Company name (Unternehmensname) is required".to_string(),
        ));
    }
    match employee.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(TallyError::Validation(
            "An employee (Mitarbeiter) must be chosen".to_string(),
        )),
    }
}

fn non_blank(value: &str, what: &str) -> TallyResult<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(TallyError::Validation(format!("Please choose or enter a {}", what)))
    } else {
        Ok(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Wizard {
    state: WizardState,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            state: WizardState::Overview,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Apply `event`, persisting through `dashboard` where the step requires it
    pub fn handle(
        &mut self,
        dashboard: &Dashboard,
        event: WizardEvent,
    ) -> TallyResult<WizardOutcome> {
        let (next, outcome) = match (&self.state, event) {
            (WizardState::Overview, WizardEvent::Start) => (
                WizardState::Selecting {
                    country: None,
                    topic: None,
                },
                WizardOutcome::Moved,
            ),

            (WizardState::Selecting { topic, .. }, WizardEvent::ChooseCountry(country)) => {
                let country = non_blank(&country, "country")?;
                // The country becomes a sheet name, so reject it before it can be counted
                validate_country_sheet(&country)?;
                (
                    WizardState::Selecting {
                        country: Some(country),
                        topic: topic.clone(),
                    },
                    WizardOutcome::Moved,
                )
            }

            (WizardState::Selecting { country, .. }, WizardEvent::ChooseTopic(topic)) => (
                WizardState::Selecting {
                    country: country.clone(),
                    topic: Some(non_blank(&topic, "topic")?),
                },
                WizardOutcome::Moved,
            ),

            (WizardState::Selecting { country, topic }, WizardEvent::Confirm) => {
                let country = country
                    .clone()
                    .ok_or_else(|| TallyError::Validation("Please choose a country".to_string()))?;
                let topic = topic
                    .clone()
                    .ok_or_else(|| TallyError::Validation("Please choose a topic".to_string()))?;
                dashboard.check_country(&country)?;
                let total = dashboard.increment_country(&country)?;
                (
                    WizardState::Form {
                        country: country.clone(),
                        topic,
                        employee: None,
                    },
                    WizardOutcome::CountryCounted { country, total },
                )
            }

            (WizardState::Form { country, topic, .. }, WizardEvent::ChooseEmployee(name)) => (
                WizardState::Form {
                    country: country.clone(),
                    topic: topic.clone(),
                    employee: Some(non_blank(&name, "employee")?),
                },
                WizardOutcome::Moved,
            ),

            (
                WizardState::Form {
                    country,
                    topic,
                    employee,
                },
                WizardEvent::Submit(input),
            ) => {
                validate_submission(employee.as_deref(), &input)?;
                let payload = DetailPayload {
                    employee: employee.clone().unwrap_or_default(),
                    company_name: input.company_name,
                    contact_name: input.contact_name,
                    ident_number: input.ident_number,
                    remark: input.remark,
                };
                let record = dashboard.append_detail(country, topic, &payload)?;
                (WizardState::Overview, WizardOutcome::Saved(record))
            }

            (WizardState::Selecting { .. } | WizardState::Form { .. }, WizardEvent::Cancel) => {
                (WizardState::Overview, WizardOutcome::Discarded)
            }

            (state, event) => {
                return Err(TallyError::InvalidTransition(format!(
                    "{:?} is not allowed in state {:?}",
                    event, state
                )))
            }
        };

        self.state = next;
        Ok(outcome)
    }
}
