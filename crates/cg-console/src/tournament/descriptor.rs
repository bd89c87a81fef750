use croner::Cron;
use serde::Serialize;

use crate::error::{ConsoleError, Result};

/// Tournament creation request, as received from a console surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTournament {
    pub title: String,
    pub description: String,
    pub category: i32,
    /// Any positive value selects descending order.
    pub sort_order: i32,
    pub operator: String,
    /// Active window length in seconds.
    pub duration: i32,
    /// Five-field cron expression. Empty means the tournament does not repeat.
    pub reset_schedule: String,
    /// JSON object text. `None` or empty means `{}`.
    pub metadata: Option<String>,
    pub start_time: i64,
    /// 0 means the tournament never ends.
    pub end_time: i64,
    pub max_size: i32,
    pub max_num_score: i32,
    pub join_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_raw(value: i32) -> Self {
        if value > 0 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 0,
            SortOrder::Descending => 1,
        }
    }
}

/// How a submitted score combines with the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Best,
    Set,
    Incr,
}

impl Operator {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "best" => Some(Operator::Best),
            "set" => Some(Operator::Set),
            "incr" => Some(Operator::Incr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Best => "best",
            Operator::Set => "set",
            Operator::Incr => "incr",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated tournament parameters, ready to hand to a store.
///
/// Only [`TournamentDescriptor::validate`] builds one, so every instance
/// satisfies the provisioning rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDescriptor {
    title: String,
    description: String,
    category: u8,
    sort_order: SortOrder,
    operator: Operator,
    duration: u32,
    reset_schedule: Option<String>,
    metadata: String,
    start_time: i64,
    end_time: i64,
    max_size: u32,
    max_num_score: u32,
    join_required: bool,
}

impl TournamentDescriptor {
    /// Check `request` field by field and build a descriptor.
    ///
    /// Fails on the first violated rule.
    pub fn validate(request: CreateTournament) -> Result<Self> {
        let sort_order = SortOrder::from_raw(request.sort_order);

        let operator = Operator::parse(&request.operator).ok_or_else(|| {
            ConsoleError::invalid_argument("Operator should be one of 'best', 'set', or 'incr'")
        })?;

        let duration = u32::try_from(request.duration)
            .ok()
            .filter(|duration| *duration > 0)
            .ok_or_else(|| ConsoleError::invalid_argument("Duration must be > 0"))?;

        let reset_schedule = parse_reset_schedule(&request.reset_schedule)?;
        let metadata = encode_metadata(request.metadata.as_deref())?;

        let checks = [
            (
                (0..=127).contains(&request.category),
                "category must be 0-127",
            ),
            (request.start_time >= 0, "startTime must be >= 0."),
            (
                request.end_time == 0 || request.end_time > request.start_time,
                "endTime must be > startTime. Use 0 to indicate a tournament that never ends.",
            ),
            (request.max_size >= 0, "maxSize must be >= 0"),
            (request.max_num_score >= 0, "maxNumScore must be >= 0"),
        ];
        if let Some((_, message)) = checks.iter().find(|(passed, _)| !passed) {
            return Err(ConsoleError::invalid_argument(*message));
        }

        // Ranges were checked above.
        let category = u8::try_from(request.category).unwrap_or_default();
        let max_size = u32::try_from(request.max_size).unwrap_or_default();
        let max_num_score = u32::try_from(request.max_num_score).unwrap_or_default();

        Ok(Self {
            title: request.title,
            description: request.description,
            category,
            sort_order,
            operator,
            duration,
            reset_schedule,
            metadata,
            start_time: request.start_time,
            end_time: request.end_time,
            max_size,
            max_num_score,
            join_required: request.join_required,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> u8 {
        self.category
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn reset_schedule(&self) -> Option<&str> {
        self.reset_schedule.as_deref()
    }

    /// Metadata as compact JSON object text.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn end_time(&self) -> i64 {
        self.end_time
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn max_num_score(&self) -> u32 {
        self.max_num_score
    }

    pub fn join_required(&self) -> bool {
        self.join_required
    }
}

fn parse_reset_schedule(expression: &str) -> Result<Option<String>> {
    if expression.is_empty() {
        return Ok(None);
    }

    Cron::new(expression)
        .parse()
        .map_err(|_| ConsoleError::invalid_argument("Reset schedule should be a valid CRON expression"))?;

    Ok(Some(expression.to_string()))
}

fn encode_metadata(metadata: Option<&str>) -> Result<String> {
    let text = match metadata {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Ok("{}".to_string()),
    };

    let value: serde_json::Value = serde_json::from_str(text)
        .ok()
        .filter(serde_json::Value::is_object)
        .ok_or_else(|| ConsoleError::invalid_argument("Metadata must be a JSON object"))?;

    serde_json::to_string(&value)
        .map_err(|_| ConsoleError::internal("Error encoding tournament metadata"))
}
