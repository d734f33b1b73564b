use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

pub type EntityId = i64;
pub type UserId = i64;

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Timestamps as the backend writes them: naive ISO-8601 in UTC
/// (`2024-01-15T10:30:00`). RFC 3339 input is accepted too.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(WIRE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

// Auth

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: Option<String>,
    pub access_token: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// What every create endpoint answers with. Some return the whole entity,
/// workouts only `{id, message}`; the id is all a caller can rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Created {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Workouts

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: EntityId,
    pub set_number: i32,
    pub reps: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: EntityId,
    pub name: String,
    pub sets: Vec<WorkoutSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: EntityId,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub template_id: Option<EntityId>,
    pub exercises: Vec<WorkoutExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutSet {
    pub set_number: i32,
    pub reps: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutExercise {
    pub name: String,
    pub sets: Vec<NewWorkoutSet>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NewWorkout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<EntityId>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "timestamp::option::serialize"
    )]
    pub date: Option<DateTime<Utc>>,
    pub exercises: Vec<NewWorkoutExercise>,
}

impl NewWorkout {
    /// Expands a template into a workout draft: one numbered set per
    /// template set, reps taken from the leading number of the template's
    /// reps text ("8-10" gives 8), weight left at zero.
    pub fn from_template(template: &Template) -> Self {
        let exercises = template
            .exercises
            .iter()
            .map(|exercise| {
                let reps = exercise.reps.as_deref().map(leading_number).unwrap_or(0);
                let set_count = exercise.sets.unwrap_or(0).max(0);
                NewWorkoutExercise {
                    name: exercise.name.clone(),
                    sets: (1..=set_count)
                        .map(|set_number| NewWorkoutSet {
                            set_number,
                            reps,
                            weight: 0.0,
                        })
                        .collect(),
                }
            })
            .collect();
        NewWorkout {
            template_id: Some(template.id),
            date: None,
            exercises,
        }
    }
}

fn leading_number(text: &str) -> i32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutUpdate {
    pub exercises: Vec<NewWorkoutExercise>,
}

// Templates

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub id: EntityId,
    pub name: String,
    pub sets: Option<i32>,
    pub reps: Option<String>,
    pub alternatives: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: EntityId,
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<TemplateExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplateExercise {
    pub name: String,
    pub sets: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTemplate {
    pub name: String,
    pub exercises: Vec<NewTemplateExercise>,
}

impl NewTemplate {
    pub const DEFAULT_NAME: &'static str = "Default Template";
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TemplateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<NewTemplateExercise>>,
}

// Nutrition

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
    pub id: EntityId,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNutritionEntry {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "timestamp::option::serialize"
    )]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NutritionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

// Weight

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: EntityId,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWeightEntry {
    pub weight: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "timestamp::option::serialize"
    )]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightUpdate {
    pub weight: f64,
}

// Goals

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GoalType {
    Weight,
    Calories,
    WorkoutCount,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GoalPeriod {
    #[default]
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    pub period: GoalPeriod,
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGoal {
    pub goal_type: GoalType,
    pub target_value: f64,
    pub period: GoalPeriod,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GoalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_naive_and_rfc3339_timestamps_are_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(timestamp::parse("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(timestamp::parse("2024-01-15T10:30:00.000000"), Some(expected));
        assert_eq!(timestamp::parse("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(timestamp::parse("2024-01-15T12:30:00+02:00"), Some(expected));
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn test_created_accepts_both_create_answers() {
        let workout: Created =
            serde_json::from_str(r#"{"id": 5, "message": "Workout logged successfully"}"#).unwrap();
        assert_eq!(workout.id, 5);
        assert_eq!(workout.message.as_deref(), Some("Workout logged successfully"));

        let weight: Created =
            serde_json::from_str(r#"{"id": 9, "date": "2024-01-15T10:30:00", "weight": 185.5}"#)
                .unwrap();
        assert_eq!(weight.id, 9);
        assert_eq!(weight.message, None);
    }

    #[test]
    fn test_weight_entry_from_backend_payload() {
        let entry: WeightEntry =
            serde_json::from_str(r#"{"id": 1, "date": "2024-01-15T10:30:00", "weight": 185.5}"#)
                .unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(entry.weight, 185.5);
        assert_eq!(
            entry.date,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_goal_enums_use_snake_case() {
        let goal = NewGoal {
            goal_type: GoalType::WorkoutCount,
            target_value: 12.0,
            period: GoalPeriod::Month,
        };
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["goal_type"], "workout_count");
        assert_eq!(json["period"], "month");
        assert_eq!("Workout_Count".parse::<GoalType>().unwrap(), GoalType::WorkoutCount);
    }

    #[test]
    fn test_login_request_exposes_password_only_on_the_wire() {
        let request = LoginRequest {
            username: "alice".to_string(),
            password: SecretString::from("pw123".to_string()),
        };
        assert!(!format!("{request:?}").contains("pw123"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["password"], "pw123");
    }

    #[test]
    fn test_new_workout_from_template() {
        let template = Template {
            id: 7,
            name: "Leg Day".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            exercises: vec![
                TemplateExercise {
                    id: 1,
                    name: "Squat".to_string(),
                    sets: Some(3),
                    reps: Some("8-10".to_string()),
                    alternatives: None,
                },
                TemplateExercise {
                    id: 2,
                    name: "Lunge".to_string(),
                    sets: Some(2),
                    reps: Some("AMRAP".to_string()),
                    alternatives: None,
                },
            ],
        };

        let workout = NewWorkout::from_template(&template);

        assert_eq!(workout.template_id, Some(7));
        assert_eq!(workout.exercises.len(), 2);
        let squat = &workout.exercises[0];
        assert_eq!(squat.sets.len(), 3);
        assert_eq!(squat.sets[2].set_number, 3);
        assert!(squat.sets.iter().all(|set| set.reps == 8 && set.weight == 0.0));
        assert!(workout.exercises[1].sets.iter().all(|set| set.reps == 0));

        let json = serde_json::to_value(&workout).unwrap();
        assert!(json.get("date").is_none());
    }
}
