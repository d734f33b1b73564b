use std::borrow::Cow;

use secrecy::ExposeSecret;
use shared::{
    GoalUpdate, LoginRequest, NewGoal, NewNutritionEntry, NewTemplate, NewTemplateExercise,
    NewWeightEntry, NewWorkout, NewWorkoutExercise, NutritionUpdate, RegisterRequest,
    TemplateUpdate, WeightUpdate, WorkoutUpdate,
};

use crate::error::{Error, Result};

/// Required-field checks done before anything is sent.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

#[derive(Default)]
struct Checks {
    errors: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl Checks {
    fn require(&mut self, ok: bool, field: impl Into<Cow<'static, str>>, message: &'static str) {
        if !ok {
            self.errors.push((field.into(), message.into()));
        }
    }

    fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(self.errors))
        }
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.require(
            !self.username.trim().is_empty(),
            "username",
            "username must not be empty",
        );
        checks.require(
            !self.password.expose_secret().trim().is_empty(),
            "password",
            "password must not be empty",
        );
        checks.finish()
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.require(
            !self.username.trim().is_empty(),
            "username",
            "username must not be empty",
        );
        checks.require(!self.email.trim().is_empty(), "email", "email must not be empty");
        checks.require(
            !self.password.expose_secret().trim().is_empty(),
            "password",
            "password must not be empty",
        );
        checks.finish()
    }
}

fn check_workout_exercises(checks: &mut Checks, exercises: &[NewWorkoutExercise]) {
    checks.require(
        !exercises.is_empty(),
        "exercises",
        "at least one exercise is required",
    );
    for exercise in exercises {
        checks.require(
            !exercise.name.trim().is_empty(),
            "exercises.name",
            "exercise name must not be empty",
        );
        for set in &exercise.sets {
            checks.require(set.reps >= 0, "exercises.sets.reps", "reps must not be negative");
            checks.require(
                non_negative(set.weight),
                "exercises.sets.weight",
                "weight must not be negative",
            );
        }
    }
}

impl Validate for NewWorkout {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        check_workout_exercises(&mut checks, &self.exercises);
        checks.finish()
    }
}

impl Validate for WorkoutUpdate {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        check_workout_exercises(&mut checks, &self.exercises);
        checks.finish()
    }
}

fn check_template_exercises(checks: &mut Checks, exercises: &[NewTemplateExercise]) {
    checks.require(
        !exercises.is_empty(),
        "exercises",
        "at least one exercise is required",
    );
    for exercise in exercises {
        checks.require(
            !exercise.name.trim().is_empty(),
            "exercises.name",
            "exercise name must not be empty",
        );
        checks.require(exercise.sets > 0, "exercises.sets", "sets must be positive");
    }
}

impl Validate for NewTemplate {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        check_template_exercises(&mut checks, &self.exercises);
        checks.finish()
    }
}

impl Validate for TemplateUpdate {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        if let Some(name) = &self.name {
            checks.require(!name.trim().is_empty(), "name", "name must not be empty");
        }
        if let Some(exercises) = &self.exercises {
            check_template_exercises(&mut checks, exercises);
        }
        checks.finish()
    }
}

impl Validate for NewNutritionEntry {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        for (field, value) in [
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fats", self.fats),
            ("calories", self.calories),
        ] {
            checks.require(non_negative(value), field, "value must be a non-negative number");
        }
        checks.finish()
    }
}

impl Validate for NutritionUpdate {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        for (field, value) in [
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fats", self.fats),
            ("calories", self.calories),
        ] {
            if let Some(value) = value {
                checks.require(non_negative(value), field, "value must be a non-negative number");
            }
        }
        checks.finish()
    }
}

impl Validate for NewWeightEntry {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.require(positive(self.weight), "weight", "weight must be positive");
        checks.finish()
    }
}

impl Validate for WeightUpdate {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.require(positive(self.weight), "weight", "weight must be positive");
        checks.finish()
    }
}

impl Validate for NewGoal {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        checks.require(
            positive(self.target_value),
            "target_value",
            "target value must be positive",
        );
        checks.finish()
    }
}

impl Validate for GoalUpdate {
    fn validate(&self) -> Result<()> {
        let mut checks = Checks::default();
        if let Some(current_value) = self.current_value {
            checks.require(
                current_value.is_finite(),
                "current_value",
                "current value must be a number",
            );
        }
        checks.require(
            self.current_value.is_some() || self.completed.is_some(),
            "goal",
            "nothing to update",
        );
        checks.finish()
    }
}
