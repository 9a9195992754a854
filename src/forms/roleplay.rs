//! Forms for roleplay scenarios and practice sessions.

use serde::Deserialize;

use crate::{
    domain::{
        roleplay::{NewRoleplayScenario, Objections, UpdateRoleplayScenario},
        types::{HubId, NonEmptyString, ScenarioId, Score, Title},
    },
    forms::FormError,
};

#[derive(Debug, Deserialize)]
pub struct ScenarioForm {
    pub title: String,
    pub persona: String,
    /// One objection per line.
    #[serde(default)]
    pub objections: String,
}

pub struct ScenarioPayload {
    pub title: Title,
    pub persona: NonEmptyString,
    pub objections: Objections,
}

impl TryFrom<ScenarioForm> for ScenarioPayload {
    type Error = FormError;

    fn try_from(form: ScenarioForm) -> Result<Self, Self::Error> {
        let objections = Objections::parse(&form.objections).map_err(|_| {
            FormError::InvalidValue("切り返し練習の反論を1行以上入力してください".to_string())
        })?;
        Ok(Self {
            title: Title::new(ammonia::clean(&form.title))?,
            persona: NonEmptyString::sanitized(form.persona)?,
            objections,
        })
    }
}

impl ScenarioPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewRoleplayScenario {
        NewRoleplayScenario {
            hub_id,
            title: self.title,
            persona: self.persona,
            objections: self.objections,
        }
    }

    pub fn into_update(self) -> UpdateRoleplayScenario {
        UpdateRoleplayScenario {
            title: self.title,
            persona: self.persona,
            objections: self.objections,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartSessionForm {
    pub scenario_id: i32,
}

impl TryFrom<StartSessionForm> for ScenarioId {
    type Error = FormError;

    fn try_from(form: StartSessionForm) -> Result<Self, Self::Error> {
        Ok(ScenarioId::new(form.scenario_id)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptForm {
    pub transcript: String,
}

impl TryFrom<TranscriptForm> for NonEmptyString {
    type Error = FormError;

    fn try_from(form: TranscriptForm) -> Result<Self, Self::Error> {
        Ok(NonEmptyString::sanitized(form.transcript)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct GradeSessionForm {
    pub score: i32,
}

impl TryFrom<GradeSessionForm> for Score {
    type Error = FormError;

    fn try_from(form: GradeSessionForm) -> Result<Self, Self::Error> {
        Ok(Score::new(form.score)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_needs_an_objection() {
        let form = ScenarioForm {
            title: "Busy CFO".to_string(),
            persona: "Short on time".to_string(),
            objections: "\n  \n".to_string(),
        };
        assert!(matches!(
            ScenarioPayload::try_from(form),
            Err(FormError::InvalidValue(_))
        ));
    }

    #[test]
    fn scenario_splits_objections_by_line() {
        let form = ScenarioForm {
            title: "Busy CFO".to_string(),
            persona: "Short on time".to_string(),
            objections: "高い\n\n 今は忙しい \n".to_string(),
        };
        let payload = ScenarioPayload::try_from(form).expect("valid form");
        assert_eq!(payload.objections.as_slice(), ["高い", "今は忙しい"]);
    }

    #[test]
    fn grade_is_bounded() {
        assert_eq!(
            Score::try_from(GradeSessionForm { score: -5 }),
            Err(FormError::InvalidScore)
        );
    }
}
