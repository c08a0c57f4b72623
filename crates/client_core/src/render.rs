//! Maps a decoded analysis response onto display content.
//!
//! Rendering is pure: the same response always yields the same blocks, and
//! the output replaces whatever the display region showed before.

use std::fmt;

use serde::Serialize;
use shared::protocol::{AnalysisReport, AnalysisResponse, ConditionResult};

use crate::error::GENERIC_ERROR_MESSAGE;

pub const NO_DESCRIPTION: &str = "N/A";
pub const NO_MARKERS: &str = "None specified";
pub const NO_RISK_SCORE: &str = "N/A";
pub const MARKER_DELIMITER: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultCard {
    pub title: String,
    pub description: String,
    pub markers: String,
    pub risk_score: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum DisplayBlock {
    Busy(String),
    Error(String),
    Banner(String),
    Info(String),
    Card(ResultCard),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayContent {
    blocks: Vec<DisplayBlock>,
}

impl DisplayContent {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn busy(placeholder: impl Into<String>) -> Self {
        Self::single(DisplayBlock::Busy(placeholder.into()))
    }

    fn single(block: DisplayBlock) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    pub fn blocks(&self) -> &[DisplayBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.blocks.as_slice(), [DisplayBlock::Busy(_)])
    }

    pub fn cards(&self) -> impl Iterator<Item = &ResultCard> {
        self.blocks.iter().filter_map(|block| match block {
            DisplayBlock::Card(card) => Some(card),
            _ => None,
        })
    }
}

pub fn render(response: &AnalysisResponse) -> DisplayContent {
    match response {
        AnalysisResponse::Failure(body) => {
            let message = body
                .error
                .as_deref()
                .filter(|error| !error.is_empty())
                .unwrap_or(GENERIC_ERROR_MESSAGE);
            DisplayContent::single(DisplayBlock::Error(message.to_string()))
        }
        AnalysisResponse::Success(report) => render_report(report),
    }
}

fn render_report(report: &AnalysisReport) -> DisplayContent {
    let message = report.message.clone().unwrap_or_default();
    if report.results.is_empty() {
        return DisplayContent::single(DisplayBlock::Info(message));
    }

    let mut blocks = Vec::with_capacity(report.results.len() + 1);
    blocks.push(DisplayBlock::Banner(message));
    blocks.extend(
        report
            .results
            .iter()
            .map(|result| DisplayBlock::Card(result_card(result))),
    );
    DisplayContent { blocks }
}

fn result_card(result: &ConditionResult) -> ResultCard {
    let entry = &result.entry;

    let description = entry
        .description
        .as_deref()
        .filter(|description| !description.is_empty())
        .unwrap_or(NO_DESCRIPTION)
        .to_string();

    let markers = entry
        .markers_found
        .as_ref()
        .map(|markers| markers.join(MARKER_DELIMITER))
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| NO_MARKERS.to_string());

    let risk_score = entry
        .calculated_risk_score
        .filter(|score| score.is_finite())
        .map(|score| format!("{score:.4}"))
        .unwrap_or_else(|| NO_RISK_SCORE.to_string());

    ResultCard {
        title: result.condition.clone(),
        description,
        markers,
        risk_score,
    }
}

impl fmt::Display for DisplayContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, block) in self.blocks.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayBlock::Busy(text) => writeln!(f, "... {text}"),
            DisplayBlock::Error(text) => writeln!(f, "[error] {text}"),
            DisplayBlock::Banner(text) => writeln!(f, "[ok] {text}"),
            DisplayBlock::Info(text) => writeln!(f, "[info] {text}"),
            DisplayBlock::Card(card) => {
                writeln!(f, "{}", card.title)?;
                writeln!(f, "  Description:   {}", card.description)?;
                writeln!(f, "  Markers found: {}", card.markers)?;
                writeln!(f, "  Risk score:    {}", card.risk_score)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
