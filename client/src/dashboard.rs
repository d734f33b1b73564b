use chrono::NaiveDate;
use shared::{Goal, NutritionEntry, WeightEntry, Workout};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::list::ResourceListController;
use crate::resource::{GoalFilter, Lookback};
use crate::timeline;

pub const WORKOUT_LOOKBACK: Lookback = Lookback::Days(30);
pub const WEIGHT_LOOKBACK: Lookback = Lookback::Days(90);
pub const NUTRITION_LOOKBACK: Lookback = Lookback::Days(30);
pub const RECENT_WORKOUTS: usize = 5;

/// The four lists behind the overview screen.
pub struct Dashboard {
    pub workouts: ResourceListController<Workout>,
    pub weight: ResourceListController<WeightEntry>,
    pub nutrition: ResourceListController<NutritionEntry>,
    pub goals: ResourceListController<Goal>,
}

/// Outcome of one dashboard load. Each section fails on its own.
#[derive(Debug)]
pub struct DashboardSummary {
    pub workouts: Result<Vec<Workout>>,
    pub weight: Result<Vec<WeightEntry>>,
    pub nutrition: Result<Vec<NutritionEntry>>,
    pub goals: Result<Vec<Goal>>,
}

impl Dashboard {
    pub fn new(api: &ApiClient) -> Self {
        Self {
            workouts: ResourceListController::over_api(api, WORKOUT_LOOKBACK),
            weight: ResourceListController::over_api(api, WEIGHT_LOOKBACK),
            nutrition: ResourceListController::over_api(api, NUTRITION_LOOKBACK),
            goals: ResourceListController::over_api(api, GoalFilter::default()),
        }
    }

    /// Reloads all four lists concurrently and waits for every one of them.
    pub async fn load(&self) -> DashboardSummary {
        let (workouts, weight, nutrition, goals) = futures::join!(
            self.workouts.reload(WORKOUT_LOOKBACK),
            self.weight.reload(WEIGHT_LOOKBACK),
            self.nutrition.reload(NUTRITION_LOOKBACK),
            self.goals.reload(GoalFilter::default()),
        );

        let summary = DashboardSummary {
            workouts: workouts.map(|_| self.workouts.items()),
            weight: weight.map(|_| self.weight.items()),
            nutrition: nutrition.map(|_| self.nutrition.items()),
            goals: goals.map(|_| self.goals.items()),
        };

        let failures = summary.failures();
        if failures.is_empty() {
            info!("Dashboard loaded");
        } else {
            for (section, error) in &failures {
                warn!(section, %error, "Dashboard section failed");
            }
        }
        summary
    }
}

impl DashboardSummary {
    pub fn failures(&self) -> Vec<(&'static str, &Error)> {
        [
            ("workouts", self.workouts.as_ref().err()),
            ("weight", self.weight.as_ref().err()),
            ("nutrition", self.nutrition.as_ref().err()),
            ("goals", self.goals.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(section, error)| error.map(|error| (section, error)))
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn workout_count(&self) -> Option<usize> {
        self.workouts.as_ref().ok().map(Vec::len)
    }

    pub fn nutrition_count(&self) -> Option<usize> {
        self.nutrition.as_ref().ok().map(Vec::len)
    }

    pub fn weight_count(&self) -> Option<usize> {
        self.weight.as_ref().ok().map(Vec::len)
    }

    pub fn active_goal_count(&self) -> Option<usize> {
        self.goals
            .as_ref()
            .ok()
            .map(|goals| goals.iter().filter(|goal| !goal.completed).count())
    }

    /// Newest first.
    pub fn recent_workouts(&self) -> Vec<&Workout> {
        let mut workouts: Vec<&Workout> = match &self.workouts {
            Ok(workouts) => workouts.iter().collect(),
            Err(_) => return Vec::new(),
        };
        workouts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        workouts.truncate(RECENT_WORKOUTS);
        workouts
    }

    pub fn weight_series(&self) -> Vec<(NaiveDate, f64)> {
        match &self.weight {
            Ok(entries) => timeline::weight_series(entries),
            Err(_) => Vec::new(),
        }
    }
}
