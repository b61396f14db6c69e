//! Input scripts.
//!
//! One command per line; lines starting with `#` are comments. Commands:
//!
//! ```text
//! load <slot> <bullet>      pick <bullet>         hover <bullet|none>
//! spin [ctrl|alt]           drag <angle>...       fire
//! key <space|r|1-6>         slot <n> [alt]        bg [alt]
//! eject <n> [fast]          reset                 quick-load
//! preset <save|clear|load> <i>
//! name <name> | <message>   name-clear            name-dismiss
//! naming <on|off>           counter <on|off>      holster <on|off>
//! color <#rrggbb>           style <name>
//! wait <ms>                 settle                state
//! ```
//!
//! Bullets are palette ids `1` to `6`, `dud` or `custom`. Slots are 0-based.

use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;

use cylinder::EjectSpeed;
use spinofsin_core::{BulletChoice, Game, Key, Modifiers};

/// One parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load { slot: usize, bullet: BulletChoice },
    Pick(BulletChoice),
    Hover(Option<BulletChoice>),
    Spin(Modifiers),
    Drag(Vec<f64>),
    Fire,
    Key(Key),
    Slot { slot: usize, modifiers: Modifiers },
    Background(Modifiers),
    Eject { slot: usize, speed: EjectSpeed },
    Reset,
    QuickLoad,
    SavePreset(usize),
    ClearPreset(usize),
    LoadPreset(usize),
    Name { name: String, message: String },
    ClearName,
    DismissName,
    Naming(bool),
    Counter(bool),
    Holster(bool),
    Color(String),
    Style(String),
    Wait(Duration),
    Settle,
    State,
}

/// Parses a whole script. Errors name the offending line.
pub fn parse_script(text: &str) -> Result<Vec<Command>> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(parse_line(line).with_context(|| format!("line {}: `{}`", index + 1, line)))
            }
        })
        .collect()
}

fn parse_line(line: &str) -> Result<Command> {
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word {
        "load" => {
            let [slot, bullet] = args[..] else {
                bail!("expected `load <slot> <bullet>`");
            };
            Command::Load {
                slot: parse_number(slot)?,
                bullet: parse_bullet(bullet)?,
            }
        }
        "pick" => Command::Pick(parse_bullet(single(&args)?)?),
        "hover" => match single(&args)? {
            "none" => Command::Hover(None),
            bullet => Command::Hover(Some(parse_bullet(bullet)?)),
        },
        "spin" => Command::Spin(parse_modifiers(&args)?),
        "drag" => {
            if args.len() < 2 {
                bail!("a drag needs at least two pointer angles");
            }
            let angles = args
                .iter()
                .map(|a| a.parse::<f64>().with_context(|| format!("bad angle `{a}`")))
                .collect::<Result<Vec<_>>>()?;
            Command::Drag(angles)
        }
        "fire" => Command::Fire,
        "key" => {
            let name = single(&args)?;
            Command::Key(Key::from_name(name).ok_or_else(|| anyhow!("unknown key `{name}`"))?)
        }
        "slot" => {
            let (slot, flags) = args.split_first().ok_or_else(|| anyhow!("missing slot"))?;
            Command::Slot {
                slot: parse_number(slot)?,
                modifiers: parse_modifiers(flags)?,
            }
        }
        "bg" => Command::Background(parse_modifiers(&args)?),
        "eject" => {
            let (slot, flags) = args.split_first().ok_or_else(|| anyhow!("missing slot"))?;
            let speed = match flags {
                [] => EjectSpeed::Normal,
                ["fast"] => EjectSpeed::Fast,
                _ => bail!("expected `eject <slot> [fast]`"),
            };
            Command::Eject {
                slot: parse_number(slot)?,
                speed,
            }
        }
        "reset" => Command::Reset,
        "quick-load" => Command::QuickLoad,
        "preset" => {
            let [action, index] = args[..] else {
                bail!("expected `preset <save|clear|load> <index>`");
            };
            let index = parse_number(index)?;
            match action {
                "save" => Command::SavePreset(index),
                "clear" => Command::ClearPreset(index),
                "load" => Command::LoadPreset(index),
                other => bail!("unknown preset action `{other}`"),
            }
        }
        "name" => {
            let (name, message) = rest.split_once('|').unwrap_or((rest, ""));
            Command::Name {
                name: name.trim().to_string(),
                message: message.trim().to_string(),
            }
        }
        "name-clear" => Command::ClearName,
        "name-dismiss" => Command::DismissName,
        "naming" => Command::Naming(parse_switch(single(&args)?)?),
        "counter" => Command::Counter(parse_switch(single(&args)?)?),
        "holster" => Command::Holster(parse_switch(single(&args)?)?),
        "color" => Command::Color(single(&args)?.to_string()),
        "style" => Command::Style(single(&args)?.to_string()),
        "wait" => Command::Wait(Duration::from_millis(parse_number(single(&args)?)?)),
        "settle" => Command::Settle,
        "state" => Command::State,
        other => bail!("unknown command `{other}`"),
    };
    Ok(command)
}

fn single<'a>(args: &[&'a str]) -> Result<&'a str> {
    match args {
        [arg] => Ok(arg),
        _ => bail!("expected exactly one argument"),
    }
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse::<T>()
        .with_context(|| format!("bad number `{text}`"))
}

fn parse_bullet(text: &str) -> Result<BulletChoice> {
    match text {
        "dud" => Ok(BulletChoice::Dud),
        "custom" => Ok(BulletChoice::Custom),
        id => Ok(BulletChoice::Palette(parse_number(id)?)),
    }
}

fn parse_switch(text: &str) -> Result<bool> {
    match text {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => bail!("expected on or off, got `{other}`"),
    }
}

fn parse_modifiers(flags: &[&str]) -> Result<Modifiers> {
    let mut modifiers = Modifiers::default();
    for &flag in flags {
        match flag {
            "alt" => modifiers.alt = true,
            "ctrl" => modifiers.ctrl = true,
            other => bail!("unknown modifier `{other}`"),
        }
    }
    Ok(modifiers)
}

// ============================================================================
// Running
// ============================================================================

/// Upper bound on frames `settle` waits for a spin to stop.
const SETTLE_FRAME_LIMIT: u32 = 100_000;

/// Time `settle` keeps ticking after the chamber stops, long enough for any
/// fire, reset or preset sequence to finish.
const SETTLE_TAIL: Duration = Duration::from_millis(3000);

/// Applies `command` to `game`.
///
/// Rejected actions are not errors here: the game already recorded a notice
/// event for them.
pub fn apply(game: &mut Game, command: &Command, frame: Duration) {
    let outcome = match command {
        Command::Load { slot, bullet } => game.load(*slot, *bullet),
        Command::Pick(bullet) => game.click_to_load(*bullet),
        Command::Hover(bullet) => {
            game.set_hovered(*bullet);
            Ok(())
        }
        Command::Spin(modifiers) => {
            game.click_hub(*modifiers);
            Ok(())
        }
        Command::Drag(angles) => {
            drag(game, angles);
            Ok(())
        }
        Command::Fire => {
            if !game.fire() {
                tracing::info!("fire dropped in {}", game.state());
            }
            Ok(())
        }
        Command::Key(key) => game.key_press(*key),
        Command::Slot { slot, modifiers } => game.click_slot(*slot, *modifiers),
        Command::Background(modifiers) => {
            game.click_background(*modifiers);
            Ok(())
        }
        Command::Eject { slot, speed } => game.eject(*slot, *speed),
        Command::Reset => {
            game.reset();
            Ok(())
        }
        Command::QuickLoad => {
            game.quick_load();
            Ok(())
        }
        Command::SavePreset(index) => game.save_preset(*index),
        Command::ClearPreset(index) => game.clear_preset(*index),
        Command::LoadPreset(index) => game.load_preset(*index),
        Command::Name { name, message } => game.submit_name(name, message),
        Command::ClearName => {
            game.clear_name();
            Ok(())
        }
        Command::DismissName => {
            game.dismiss_name();
            Ok(())
        }
        Command::Naming(on) => {
            game.set_naming_enabled(*on);
            Ok(())
        }
        Command::Counter(on) => {
            game.set_counter_visible(*on);
            Ok(())
        }
        Command::Holster(on) => {
            game.set_holster_visible(*on);
            Ok(())
        }
        Command::Color(color) => game.set_custom_color(color),
        Command::Style(style) => {
            game.set_chamber_style(style.as_str());
            Ok(())
        }
        Command::Wait(duration) => {
            game.run_for(*duration, frame);
            Ok(())
        }
        Command::Settle => {
            settle(game, frame);
            Ok(())
        }
        Command::State => Ok(()),
    };
    if let Err(err) = outcome {
        tracing::info!("rejected: {}", err);
    }
}

fn drag(game: &mut Game, angles: &[f64]) {
    let Some((&first, rest)) = angles.split_first() else {
        return;
    };
    if !game.begin_drag(first) {
        tracing::info!("drag refused in {}", game.state());
        return;
    }
    for &angle in rest {
        game.drag(angle);
    }
    game.end_drag();
}

fn settle(game: &mut Game, frame: Duration) {
    let mut frames = 0;
    while game.engine().is_spinning() && frames < SETTLE_FRAME_LIMIT {
        game.tick(frame);
        frames += 1;
    }
    if game.engine().is_spinning() {
        tracing::warn!("chamber still spinning after {} frames", frames);
    }
    game.run_for(SETTLE_TAIL, frame);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_form() {
        let script = "\
            # warm up\n\
            load 0 1\n\
            load 3 dud\n\
            pick custom\n\
            hover none\n\
            spin ctrl\n\
            drag 0 10 30\n\
            key space\n\
            slot 2 alt\n\
            eject 1 fast\n\
            preset load 3\n\
            name Big Red | Goodbye\n\
            naming on\n\
            wait 250\n\
            settle\n";
        let commands = parse_script(script).unwrap();
        assert_eq!(commands.len(), 14);
        assert_eq!(
            commands[0],
            Command::Load {
                slot: 0,
                bullet: BulletChoice::Palette(1)
            }
        );
        assert_eq!(commands[4], Command::Spin(Modifiers::ctrl()));
        assert_eq!(commands[5], Command::Drag(vec![0.0, 10.0, 30.0]));
        assert_eq!(
            commands[10],
            Command::Name {
                name: "Big Red".into(),
                message: "Goodbye".into()
            }
        );
        assert_eq!(commands[12], Command::Wait(Duration::from_millis(250)));
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_script("fire\nload x 1\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert!(parse_script("teleport").is_err());
        assert!(parse_script("drag 5").is_err());
        assert!(parse_script("eject 1 slow").is_err());
    }

    #[test]
    fn script_plays_a_round() {
        let mut game = Game::with_seed(spinofsin_core::GameConfig::default(), 3);
        let frame = Duration::from_millis(16);
        let commands = parse_script("pick 1\nwait 500\nfire\nsettle\n").unwrap();
        for command in &commands {
            apply(&mut game, command, frame);
        }
        assert!(game.chamber().slot(0).unwrap().is_spent());
        assert!(!game.is_firing());
    }
}
