use std::fmt::Debug;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    EntityId, Goal, GoalUpdate, NewGoal, NewNutritionEntry, NewTemplate, NewWeightEntry,
    NewWorkout, NutritionEntry, NutritionUpdate, Template, TemplateUpdate, WeightEntry,
    WeightUpdate, Workout, WorkoutUpdate,
};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::timeline;
use crate::validate::Validate;

/// Query parameters sent with a list request.
pub trait ListQuery: Clone + Debug + PartialEq + Send + Sync + 'static {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

impl ListQuery for () {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// How far back a dated list reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookback {
    Days(u32),
    AllTime,
}

impl ListQuery for Lookback {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Lookback::Days(days) => vec![("days", days.to_string())],
            Lookback::AllTime => Vec::new(),
        }
    }
}

impl FromStr for Lookback {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("all") {
            Ok(Lookback::AllTime)
        } else {
            value.parse().map(Lookback::Days)
        }
    }
}

/// The ranges offered by the weight view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr, Display, EnumIter)]
pub enum WeightRange {
    #[strum(serialize = "7")]
    Week,
    #[strum(serialize = "30")]
    Month,
    #[strum(serialize = "90")]
    Quarter,
    #[strum(serialize = "365")]
    Year,
    #[default]
    #[strum(serialize = "all", ascii_case_insensitive)]
    AllTime,
}

impl WeightRange {
    pub fn lookback(self) -> Lookback {
        match self {
            WeightRange::Week => Lookback::Days(7),
            WeightRange::Month => Lookback::Days(30),
            WeightRange::Quarter => Lookback::Days(90),
            WeightRange::Year => Lookback::Days(365),
            WeightRange::AllTime => Lookback::AllTime,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeightRange::Week => "7 Days",
            WeightRange::Month => "30 Days",
            WeightRange::Quarter => "90 Days",
            WeightRange::Year => "1 Year",
            WeightRange::AllTime => "All Time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalFilter {
    pub completed: Option<bool>,
}

impl ListQuery for GoalFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self.completed {
            Some(completed) => vec![("completed", completed.to_string())],
            None => Vec::new(),
        }
    }
}

/// What a list does after a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Drop the item from the cached list.
    RemoveLocally,
    /// Fetch the list again with the current filter.
    Reload,
}

/// A backend collection: its path, payloads, list filter and the rules the
/// list controller applies to it.
pub trait Resource: Clone + Debug + PartialEq + DeserializeOwned + Send + Sync + 'static {
    type New: Serialize + Validate + Debug + Send + Sync;
    type Update: Serialize + Validate + Debug + Send + Sync;
    type Filter: ListQuery;

    const PATH: &'static str;
    const NAME: &'static str;
    const DELETE_POLICY: DeletePolicy;

    fn id(&self) -> EntityId;

    /// Order applied to every freshly fetched list.
    fn arrange(items: Vec<Self>) -> Vec<Self> {
        items
    }
}

impl Resource for Workout {
    type New = NewWorkout;
    type Update = WorkoutUpdate;
    type Filter = Lookback;

    const PATH: &'static str = "workouts";
    const NAME: &'static str = "workout";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::RemoveLocally;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Resource for Template {
    type New = NewTemplate;
    type Update = TemplateUpdate;
    type Filter = ();

    const PATH: &'static str = "templates";
    const NAME: &'static str = "template";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Reload;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Resource for NutritionEntry {
    type New = NewNutritionEntry;
    type Update = NutritionUpdate;
    type Filter = Lookback;

    const PATH: &'static str = "nutrition";
    const NAME: &'static str = "nutrition log";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Reload;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Resource for WeightEntry {
    type New = NewWeightEntry;
    type Update = WeightUpdate;
    type Filter = Lookback;

    const PATH: &'static str = "weight";
    const NAME: &'static str = "weight log";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Reload;

    fn id(&self) -> EntityId {
        self.id
    }

    fn arrange(items: Vec<Self>) -> Vec<Self> {
        timeline::latest_per_day(items)
    }
}

impl Resource for Goal {
    type New = NewGoal;
    type Update = GoalUpdate;
    type Filter = GoalFilter;

    const PATH: &'static str = "goals";
    const NAME: &'static str = "goal";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Reload;

    fn id(&self) -> EntityId {
        self.id
    }
}
