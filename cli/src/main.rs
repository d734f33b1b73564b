use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client::config::ClientConfig;
use client::dashboard::Dashboard;
use client::list::ResourceListController;
use client::resource::{GoalFilter, Lookback, WeightRange};
use client::session::SessionState;
use client::{auth, AppContext};
use secrecy::SecretString;
use shared::{
    Goal, GoalPeriod, GoalType, GoalUpdate, NewGoal, NewNutritionEntry, NewTemplate,
    NewTemplateExercise, NewWeightEntry, NewWorkout, NutritionEntry, Template, WeightEntry,
    Workout,
};
use tracing::level_filters::LevelFilter;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Fitness tracker command line client")]
struct Cli {
    #[clap(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FITNESS_PASSWORD")]
        password: SecretString,
    },
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FITNESS_PASSWORD")]
        password: SecretString,
    },
    Logout,
    /// Show who is logged in
    Status,
    Dashboard,
    #[command(subcommand)]
    Workouts(WorkoutCommand),
    #[command(subcommand)]
    Templates(TemplateCommand),
    #[command(subcommand)]
    Nutrition(NutritionCommand),
    #[command(subcommand)]
    Weight(WeightCommand),
    #[command(subcommand)]
    Goals(GoalCommand),
}

#[derive(Args, Debug)]
struct LookbackArg {
    /// Number of days to look back, or "all"
    #[arg(long, default_value = "30")]
    days: Lookback,
}

#[derive(Subcommand, Debug)]
enum WorkoutCommand {
    List(LookbackArg),
    /// Log a workout prefilled from a template
    Log {
        #[arg(long)]
        template: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    List,
    Show {
        id: i64,
    },
    /// Exercises are given as "name,sets[,reps[,alternatives]]"
    Add {
        #[arg(long, default_value = NewTemplate::DEFAULT_NAME)]
        name: String,
        #[arg(long = "exercise", required = true)]
        exercises: Vec<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum NutritionCommand {
    List(LookbackArg),
    Add {
        #[arg(long)]
        protein: f64,
        #[arg(long)]
        carbs: f64,
        #[arg(long)]
        fats: f64,
        #[arg(long)]
        calories: f64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum WeightCommand {
    List {
        /// One of 7, 30, 90, 365 or all
        #[arg(long, default_value = "all")]
        range: WeightRange,
    },
    Add {
        weight: f64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    List {
        /// Only goals that are not completed yet
        #[arg(long)]
        active: bool,
    },
    Add {
        #[arg(long = "type")]
        goal_type: GoalType,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value = "month")]
        period: GoalPeriod,
    },
    Progress {
        id: i64,
        value: f64,
    },
    Complete {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    debug!(config = ?cli.config, "Starting fitness client");
    let context = AppContext::from_config(cli.config)?;

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let response = auth::sign_up(&context.api, &username, &email, password).await?;
            println!("Registered and logged in as user {}", response.user_id);
        }
        Command::Login { username, password } => {
            let response = auth::sign_in(&context.api, &username, password).await?;
            println!("Logged in as user {}", response.user_id);
        }
        Command::Logout => {
            auth::sign_out(&context.api).await;
            println!("Logged out");
        }
        Command::Status => match context.session.state() {
            SessionState::Authenticated(credentials) => {
                println!("Logged in as user {}", credentials.user_id)
            }
            _ => println!("Not logged in"),
        },
        Command::Dashboard => {
            require_session(&context)?;
            dashboard(&context).await;
        }
        Command::Workouts(command) => {
            require_session(&context)?;
            workouts(&context, command).await?;
        }
        Command::Templates(command) => {
            require_session(&context)?;
            templates(&context, command).await?;
        }
        Command::Nutrition(command) => {
            require_session(&context)?;
            nutrition(&context, command).await?;
        }
        Command::Weight(command) => {
            require_session(&context)?;
            weight(&context, command).await?;
        }
        Command::Goals(command) => {
            require_session(&context)?;
            goals(&context, command).await?;
        }
    }
    Ok(())
}

fn require_session(context: &AppContext) -> Result<()> {
    if !context.session.state().is_authenticated() {
        bail!("Not logged in, run `fitness login` first");
    }
    Ok(())
}

async fn dashboard(context: &AppContext) {
    let summary = Dashboard::new(&context.api).load().await;

    let count = |value: Option<usize>| value.map_or("unavailable".to_string(), |n| n.to_string());
    println!("Workouts (30 days):   {}", count(summary.workout_count()));
    println!("Nutrition logs:       {}", count(summary.nutrition_count()));
    println!("Weight entries:       {}", count(summary.weight_count()));
    println!("Active goals:         {}", count(summary.active_goal_count()));

    let recent = summary.recent_workouts();
    if !recent.is_empty() {
        println!("\nRecent workouts:");
        for workout in recent {
            print_workout(workout);
        }
    }
    let series = summary.weight_series();
    if let (Some((first_day, first)), Some((last_day, last))) = (series.first(), series.last()) {
        println!("\nWeight: {first:.1} on {first_day} -> {last:.1} on {last_day}");
    }
    for (section, error) in summary.failures() {
        eprintln!("Could not load {section}: {error}");
    }
}

fn print_workout(workout: &Workout) {
    let names: Vec<&str> = workout
        .exercises
        .iter()
        .map(|exercise| exercise.name.as_str())
        .collect();
    println!(
        "#{:<5} {}  {}",
        workout.id,
        workout.date.format("%Y-%m-%d"),
        names.join(", ")
    );
}

async fn workouts(context: &AppContext, command: WorkoutCommand) -> Result<()> {
    match command {
        WorkoutCommand::List(LookbackArg { days }) => {
            let list: ResourceListController<Workout> =
                ResourceListController::over_api(&context.api, days);
            list.reload(days).await?;
            for workout in list.items() {
                print_workout(&workout);
            }
        }
        WorkoutCommand::Log { template } => {
            let template = context
                .api
                .fetch_one::<Template>(template)
                .await?
                .with_context(|| format!("Template {template} not found"))?;
            let list: ResourceListController<Workout> =
                ResourceListController::over_api(&context.api, Lookback::Days(30));
            let created = list.create(&NewWorkout::from_template(&template)).await?;
            println!("Logged workout #{} from template {}", created.id, template.name);
        }
        WorkoutCommand::Delete { id } => {
            let list: ResourceListController<Workout> =
                ResourceListController::over_api(&context.api, Lookback::Days(30));
            list.delete(id).await?;
            println!("Deleted workout #{id}");
        }
    }
    Ok(())
}

fn parse_template_exercise(text: &str) -> Result<NewTemplateExercise> {
    let mut parts = text.split(',').map(str::trim);
    let name = parts.next().unwrap_or_default().to_string();
    let sets = parts
        .next()
        .context("Missing set count, expected name,sets[,reps[,alternatives]]")?
        .parse()
        .with_context(|| format!("Invalid set count in {text:?}"))?;
    let reps = parts.next().filter(|reps| !reps.is_empty()).map(str::to_string);
    let alternatives = parts
        .next()
        .filter(|alternatives| !alternatives.is_empty())
        .map(str::to_string);
    Ok(NewTemplateExercise {
        name,
        sets,
        reps,
        alternatives,
    })
}

async fn templates(context: &AppContext, command: TemplateCommand) -> Result<()> {
    let list: ResourceListController<Template> =
        ResourceListController::over_api(&context.api, ());
    match command {
        TemplateCommand::List => {
            list.reload(()).await?;
            for template in list.items() {
                println!(
                    "#{:<5} {} ({} exercises)",
                    template.id,
                    template.name,
                    template.exercises.len()
                );
            }
        }
        TemplateCommand::Show { id } => {
            let template = context
                .api
                .fetch_one::<Template>(id)
                .await?
                .with_context(|| format!("Template {id} not found"))?;
            println!("{}", template.name);
            for exercise in template.exercises {
                println!(
                    "  {:<24} sets: {:<3} reps: {:<8} {}",
                    exercise.name,
                    exercise.sets.map_or("-".to_string(), |sets| sets.to_string()),
                    exercise.reps.as_deref().unwrap_or("-"),
                    exercise.alternatives.as_deref().unwrap_or("")
                );
            }
        }
        TemplateCommand::Add { name, exercises } => {
            let exercises = exercises
                .iter()
                .map(|text| parse_template_exercise(text))
                .collect::<Result<Vec<_>>>()?;
            let created = list.create(&NewTemplate { name, exercises }).await?;
            println!("Created template #{}", created.id);
        }
        TemplateCommand::Delete { id } => {
            list.delete(id).await?;
            println!("Deleted template #{id}");
        }
    }
    Ok(())
}

async fn nutrition(context: &AppContext, command: NutritionCommand) -> Result<()> {
    match command {
        NutritionCommand::List(LookbackArg { days }) => {
            let list: ResourceListController<NutritionEntry> =
                ResourceListController::over_api(&context.api, days);
            list.reload(days).await?;
            for entry in list.items() {
                println!(
                    "#{:<5} {}  {:>6.0} kcal  P {:.0}g  C {:.0}g  F {:.0}g",
                    entry.id,
                    entry.date.format("%Y-%m-%d"),
                    entry.calories,
                    entry.protein,
                    entry.carbs,
                    entry.fats
                );
            }
        }
        NutritionCommand::Add {
            protein,
            carbs,
            fats,
            calories,
        } => {
            let list: ResourceListController<NutritionEntry> =
                ResourceListController::over_api(&context.api, Lookback::Days(30));
            let created = list
                .create(&NewNutritionEntry {
                    protein,
                    carbs,
                    fats,
                    calories,
                    date: None,
                })
                .await?;
            println!("Logged nutrition #{}", created.id);
        }
        NutritionCommand::Delete { id } => {
            let list: ResourceListController<NutritionEntry> =
                ResourceListController::over_api(&context.api, Lookback::Days(30));
            list.delete(id).await?;
            println!("Deleted nutrition log #{id}");
        }
    }
    Ok(())
}

async fn weight(context: &AppContext, command: WeightCommand) -> Result<()> {
    match command {
        WeightCommand::List { range } => {
            let list: ResourceListController<WeightEntry> =
                ResourceListController::over_api(&context.api, range.lookback());
            list.reload(range.lookback()).await?;
            println!("Weight, {}", range.label());
            for entry in list.items() {
                println!("#{:<5} {}  {:.1}", entry.id, entry.date.format("%Y-%m-%d"), entry.weight);
            }
        }
        WeightCommand::Add { weight } => {
            let list: ResourceListController<WeightEntry> =
                ResourceListController::over_api(&context.api, WeightRange::default().lookback());
            let created = list.create(&NewWeightEntry { weight, date: None }).await?;
            println!("Logged weight #{}", created.id);
        }
        WeightCommand::Delete { id } => {
            let list: ResourceListController<WeightEntry> =
                ResourceListController::over_api(&context.api, WeightRange::default().lookback());
            list.delete(id).await?;
            println!("Deleted weight log #{id}");
        }
    }
    Ok(())
}

async fn goals(context: &AppContext, command: GoalCommand) -> Result<()> {
    let list: ResourceListController<Goal> =
        ResourceListController::over_api(&context.api, GoalFilter::default());
    match command {
        GoalCommand::List { active } => {
            let filter = GoalFilter {
                completed: active.then_some(false),
            };
            list.reload(filter).await?;
            for goal in list.items() {
                println!(
                    "#{:<5} {:<14} {:>8.1} / {:<8.1} per {}{}",
                    goal.id,
                    goal.goal_type,
                    goal.current_value,
                    goal.target_value,
                    goal.period,
                    if goal.completed { "  (done)" } else { "" }
                );
            }
        }
        GoalCommand::Add {
            goal_type,
            target,
            period,
        } => {
            let created = list
                .create(&NewGoal {
                    goal_type,
                    target_value: target,
                    period,
                })
                .await?;
            println!("Created goal #{}", created.id);
        }
        GoalCommand::Progress { id, value } => {
            list.update(
                id,
                &GoalUpdate {
                    current_value: Some(value),
                    ..GoalUpdate::default()
                },
            )
            .await?;
            println!("Updated goal #{id}");
        }
        GoalCommand::Complete { id } => {
            list.update(
                id,
                &GoalUpdate {
                    completed: Some(true),
                    ..GoalUpdate::default()
                },
            )
            .await?;
            println!("Completed goal #{id}");
        }
        GoalCommand::Delete { id } => {
            list.delete(id).await?;
            println!("Deleted goal #{id}");
        }
    }
    Ok(())
}
