use serde::{Deserialize, Serialize};

use crate::domain::call::CallScore;
use crate::domain::types::Score;
use crate::integrations::{HttpIntegrations, IntegrationError, IntegrationResult, ScoringClient};

#[derive(Serialize)]
struct ScoreRequest<'a> {
    transcript: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: i32,
    sentiment: String,
}

impl TryFrom<ScoreResponse> for CallScore {
    type Error = IntegrationError;

    fn try_from(response: ScoreResponse) -> Result<Self, Self::Error> {
        let quality_score = Score::new(response.score)
            .map_err(|e| IntegrationError::Decode(format!("score {}: {e}", response.score)))?;
        let sentiment = response
            .sentiment
            .parse()
            .map_err(|e| IntegrationError::Decode(format!("sentiment: {e}")))?;
        Ok(CallScore {
            quality_score,
            sentiment,
        })
    }
}

impl ScoringClient for HttpIntegrations {
    async fn score_transcript(&self, transcript: &str) -> IntegrationResult<CallScore> {
        let url = Self::endpoint(self.config.scoring_url.as_deref(), "scoring", "score")?;

        let response = self
            .post(&url)
            .json(&ScoreRequest { transcript })
            .send()
            .await?;
        let response = Self::check("scoring", response).await?;

        let scored: ScoreResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::Decode(format!("score response: {e}")))?;
        CallScore::try_from(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::Sentiment;

    #[test]
    fn response_is_validated() {
        let ok = CallScore::try_from(ScoreResponse {
            score: 82,
            sentiment: "Positive".into(),
        })
        .expect("valid score");
        assert_eq!(ok.quality_score.get(), 82);
        assert_eq!(ok.sentiment, Sentiment::Positive);

        assert!(matches!(
            CallScore::try_from(ScoreResponse {
                score: 101,
                sentiment: "Neutral".into(),
            }),
            Err(IntegrationError::Decode(_))
        ));
        assert!(matches!(
            CallScore::try_from(ScoreResponse {
                score: 50,
                sentiment: "angry".into(),
            }),
            Err(IntegrationError::Decode(_))
        ));
    }
}
