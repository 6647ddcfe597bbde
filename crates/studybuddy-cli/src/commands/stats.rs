use studybuddy_core::AppConfig;

use crate::session;

pub fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bg = session::open(config)?;
    let stats = bg.stats();
    let goal = bg.preferences().daily_goal_minutes;

    let mut json = serde_json::to_value(stats)?;
    if let Some(map) = json.as_object_mut() {
        map.insert("dailyGoal".into(), goal.into());
        map.insert(
            "goalProgressPercent".into(),
            stats.goal_progress_percent(goal).into(),
        );
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    bg.shutdown();
    Ok(())
}
