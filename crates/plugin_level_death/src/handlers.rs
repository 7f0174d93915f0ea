//! Event handlers and the player-facing messages they send.

use crate::config::DeathPenaltyConfig;
use crate::penalty::PenaltyOutcome;
use crate::LOG_PREFIX;
use bedrock_event_system::{
    ColorFormat, Event, EventBus, EventPriority, Player, PlayerDeathEvent, PlayerJoinEvent,
    PlayerQuitEvent, ServerContext, ServerError, ServerLoadEvent,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Subscribes every handler of this plugin on `events`.
pub fn register_handlers(
    events: &EventBus,
    context: Arc<dyn ServerContext>,
    config: Arc<DeathPenaltyConfig>,
) {
    events.on("level_death::on_player_join", EventPriority::Normal, |event: &PlayerJoinEvent| {
        on_player_join(event);
        Ok(())
    });

    events.on("level_death::on_player_quit", EventPriority::Normal, |event: &PlayerQuitEvent| {
        on_player_quit(event);
        Ok(())
    });

    events.on(
        "level_death::on_player_death",
        EventPriority::Normal,
        move |event: &PlayerDeathEvent| {
            on_player_death(context.as_ref(), &config, event);
            Ok(())
        },
    );

    events.on("level_death::on_server_load", EventPriority::Normal, |event: &ServerLoadEvent| {
        info!("{} is passed to on_server_load", event.event_name());
        Ok(())
    });

    // Registered second but dispatched first.
    events.on("level_death::on_server_load_2", EventPriority::High, |event: &ServerLoadEvent| {
        info!("{} is passed to on_server_load_2", event.event_name());
        Ok(())
    });
}

pub fn on_player_join(event: &PlayerJoinEvent) {
    let player = event.player.as_ref();
    if let Err(e) = player.send_message(&welcome_message(player)) {
        error!("{} Error in join handler: {}", LOG_PREFIX, e);
        return;
    }
    info!(
        "{} Player {} joined with level {}",
        LOG_PREFIX,
        player.name(),
        player.exp_level()
    );
}

pub fn on_player_quit(event: &PlayerQuitEvent) {
    let player = event.player.as_ref();
    info!(
        "{}{}[/{}] left the game.",
        ColorFormat::YELLOW,
        player.name(),
        player.address()
    );
}

/// Applies the death penalty, degrading to a broadcast notice on failure.
pub fn on_player_death(
    context: &dyn ServerContext,
    config: &DeathPenaltyConfig,
    event: &PlayerDeathEvent,
) {
    if let Err(e) = apply_death_penalty(context, config, event) {
        error!("{} Error in death handler: {}", LOG_PREFIX, e);
        context.broadcast_message(&format!(
            "{}Error applying death penalty for {}",
            ColorFormat::RED,
            event.player.name()
        ));
    }
}

/// Evaluates and applies the penalty for one death.
///
/// Returns the applied outcome, or `None` when the rule yields no penalty.
pub fn apply_death_penalty(
    context: &dyn ServerContext,
    config: &DeathPenaltyConfig,
    event: &PlayerDeathEvent,
) -> Result<Option<PenaltyOutcome>, ServerError> {
    let player = event.player.as_ref();
    let name = player.name();
    info!("{} Death event for {}", LOG_PREFIX, name);

    let current_level = player.exp_level();
    let current_exp = player.total_exp();
    let death_cause = event.describe_cause();
    info!("{} Death cause: {}", LOG_PREFIX, death_cause);

    let outcome = config.rule.evaluate(current_level, current_exp);
    if !outcome.is_penalty() {
        context.broadcast_message(&no_penalty_message(&death_cause, current_level));
        return Ok(None);
    }

    player.set_exp_level(0)?;
    player.set_exp_progress(0.0)?;
    player.give_exp(outcome.new_exp)?;

    context.broadcast_message(&death_broadcast(&death_cause, &outcome));
    player.send_message(&penalty_details(
        current_level,
        current_exp,
        &outcome,
        player.exp_level(),
    ))?;
    player.send_popup(&penalty_popup(&outcome))?;

    info!(
        "{} {} died at level {}. Lost {} XP. New total: {}",
        LOG_PREFIX,
        name,
        current_level,
        outcome.exp_lost(),
        outcome.new_exp
    );
    debug!("{} {} is now at {}", LOG_PREFIX, name, format_xp_info(player));

    Ok(Some(outcome))
}

pub fn format_xp_info(player: &dyn Player) -> String {
    format!(
        "Level: {} XP: {} Progress: {:.1}%",
        player.exp_level(),
        player.total_exp(),
        player.exp_progress() * 100.0
    )
}

pub fn welcome_message(player: &dyn Player) -> String {
    let (green, yellow, white) = (ColorFormat::GREEN, ColorFormat::YELLOW, ColorFormat::WHITE);
    format!(
        "\n{green}Welcome {}!\n{yellow}Current Level: {white}{}\n{yellow}Total XP: {white}{}\n",
        player.name(),
        player.exp_level(),
        player.total_exp()
    )
}

pub fn death_broadcast(death_cause: &str, outcome: &PenaltyOutcome) -> String {
    let (red, yellow) = (ColorFormat::RED, ColorFormat::YELLOW);
    format!(
        "{red}\u{2620} {yellow}{death_cause}\n{red}Lost {yellow}{} XP ({red}{}%{yellow})",
        outcome.exp_lost(),
        outcome.percent
    )
}

pub fn penalty_details(
    previous_level: i32,
    previous_exp: i32,
    outcome: &PenaltyOutcome,
    new_level: i32,
) -> String {
    let (red, yellow, white) = (ColorFormat::RED, ColorFormat::YELLOW, ColorFormat::WHITE);
    format!(
        "\n{red}Death Penalty Applied:\n\
         {yellow}Previous Level: {white}{previous_level}\n\
         {yellow}Previous XP: {white}{previous_exp}\n\
         {red}XP Lost: {white}{}\n\
         {yellow}New XP: {white}{}\n\
         {yellow}New Level: {white}{new_level}",
        outcome.exp_lost(),
        outcome.new_exp
    )
}

pub fn penalty_popup(outcome: &PenaltyOutcome) -> String {
    format!(
        "{}{}% XP {}({} lost)",
        ColorFormat::RED,
        outcome.percent,
        ColorFormat::YELLOW,
        outcome.exp_lost()
    )
}

pub fn no_penalty_message(death_cause: &str, level: i32) -> String {
    format!(
        "{}{death_cause}\n{}No XP penalty - level {level} not within configured ranges",
        ColorFormat::YELLOW,
        ColorFormat::GRAY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalty::{LevelRange, PenaltyRule};
    use bedrock_event_system::local::{LocalPlayer, LocalServer};

    fn threshold_config() -> DeathPenaltyConfig {
        DeathPenaltyConfig {
            rule: PenaltyRule::Threshold {
                start_level: 10,
                percent: -20,
            },
        }
    }

    fn death_of(player: &Arc<LocalPlayer>, cause: Option<&str>) -> PlayerDeathEvent {
        PlayerDeathEvent {
            player: player.clone(),
            cause: cause.map(str::to_string),
            death_message: None,
        }
    }

    fn player(level: i32, total_exp: i32) -> Arc<LocalPlayer> {
        Arc::new(LocalPlayer::with_state(
            "Steve",
            "10.0.0.5:19132".parse().unwrap(),
            level,
            total_exp,
        ))
    }

    #[test]
    fn test_penalty_applied_above_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let server = LocalServer::new(dir.path());
        let steve = player(12, 1000);

        let outcome = apply_death_penalty(&server, &threshold_config(), &death_of(&steve, Some("LAVA")))
            .unwrap()
            .unwrap();

        assert_eq!(outcome.exp_penalty, -200);
        assert_eq!(outcome.new_exp, 800);
        assert_eq!(steve.total_exp(), 800);

        let broadcasts = server.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        let broadcast = ColorFormat::strip(&broadcasts[0]);
        assert!(broadcast.contains("LAVA"));
        assert!(broadcast.contains("Lost 200 XP (-20%)"));

        let details = ColorFormat::strip(&steve.messages()[0]);
        assert!(details.contains("Previous Level: 12"));
        assert!(details.contains("Previous XP: 1000"));
        assert!(details.contains("XP Lost: 200"));
        assert!(details.contains("New XP: 800"));
        assert!(details.contains(&format!("New Level: {}", steve.exp_level())));

        assert_eq!(
            ColorFormat::strip(&steve.popups()[0]),
            "-20% XP (200 lost)"
        );
    }

    #[test]
    fn test_below_threshold_only_broadcasts() {
        let dir = tempfile::tempdir().unwrap();
        let server = LocalServer::new(dir.path());
        let steve = player(5, 1000);

        let outcome =
            apply_death_penalty(&server, &threshold_config(), &death_of(&steve, None)).unwrap();

        assert!(outcome.is_none());
        assert_eq!(steve.total_exp(), 1000);
        assert_eq!(steve.exp_level(), 5);
        assert!(steve.messages().is_empty());
        assert!(steve.popups().is_empty());

        let broadcasts = server.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        let text = ColorFormat::strip(&broadcasts[0]);
        assert!(text.starts_with("Unknown\n"));
        assert!(text.contains("No XP penalty - level 5 not within configured ranges"));
    }

    #[test]
    fn test_range_table_selects_percent() {
        let dir = tempfile::tempdir().unwrap();
        let server = LocalServer::new(dir.path());
        let config = DeathPenaltyConfig {
            rule: PenaltyRule::Ranges {
                ranges: vec![
                    LevelRange {
                        min_level: 10,
                        max_level: 30,
                        percent: -20,
                    },
                    LevelRange {
                        min_level: 31,
                        max_level: 100,
                        percent: -50,
                    },
                ],
            },
        };

        let veteran = player(45, 3000);
        let outcome = apply_death_penalty(&server, &config, &death_of(&veteran, None))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.percent, -50);
        assert_eq!(veteran.total_exp(), 1500);

        let legend = player(200, 5000);
        assert!(apply_death_penalty(&server, &config, &death_of(&legend, None))
            .unwrap()
            .is_none());
        assert_eq!(legend.total_exp(), 5000);
    }

    #[test]
    fn test_failure_broadcasts_error_notice() {
        let dir = tempfile::tempdir().unwrap();
        let server = LocalServer::new(dir.path());
        let steve = player(12, 1000);
        steve.set_online(false);

        on_player_death(&server, &threshold_config(), &death_of(&steve, None));

        let broadcasts = server.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(
            ColorFormat::strip(&broadcasts[0]),
            "Error applying death penalty for Steve"
        );
    }

    #[test]
    fn test_welcome_message_contents() {
        let steve = player(7, 120);
        let text = ColorFormat::strip(&welcome_message(steve.as_ref()));
        assert_eq!(text, "\nWelcome Steve!\nCurrent Level: 7\nTotal XP: 120\n");
    }

    #[test]
    fn test_join_sends_welcome() {
        let steve = player(3, 30);
        on_player_join(&PlayerJoinEvent {
            player: steve.clone(),
        });
        assert_eq!(steve.messages().len(), 1);

        steve.set_online(false);
        on_player_join(&PlayerJoinEvent {
            player: steve.clone(),
        });
        assert_eq!(steve.messages().len(), 1);
    }

    #[test]
    fn test_format_xp_info() {
        let alex = Arc::new(LocalPlayer::with_total_exp(
            "Alex",
            "10.0.0.6:19132".parse().unwrap(),
            373,
        ));
        assert_eq!(format_xp_info(alex.as_ref()), "Level: 16 XP: 373 Progress: 50.0%");
    }
}
