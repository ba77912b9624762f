//! Scripted button presses for headless runs.
//!
//! A press is written `BUTTON@FRAME[+FRAMES]`: hold `BUTTON` from frame
//! `FRAME` for `FRAMES` frames (default [`DEFAULT_HOLD_FRAMES`]). Buttons are
//! named as in the machine's input map (case-insensitive) or by the arcade
//! cabinet key aliases below.

use invaders_core::core::machine::{InputButton, Machine};

use crate::error::FrontendError;

pub const DEFAULT_HOLD_FRAMES: u64 = 4;

/// Classic keyboard layout: C coin, Space start, W fire, A/D move, T tilt.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("c", "Coin"),
    ("space", "P1 Start"),
    ("w", "P1 Fire"),
    ("a", "P1 Left"),
    ("d", "P1 Right"),
    ("t", "Tilt"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Press {
    pub button: u8,
    pub frame: u64,
    pub hold: u64,
}

#[derive(Debug, Default)]
pub struct InputScript {
    presses: Vec<Press>,
}

impl InputScript {
    pub fn parse(args: &[String], buttons: &[InputButton]) -> Result<Self, FrontendError> {
        let presses = args
            .iter()
            .map(|arg| parse_press(arg, buttons))
            .collect::<Result<_, _>>()?;
        Ok(Self { presses })
    }

    pub fn presses(&self) -> &[Press] {
        &self.presses
    }

    /// Apply the edges that fall on `frame`, before it runs.
    pub fn apply(&self, machine: &mut dyn Machine, frame: u64) {
        for press in &self.presses {
            if press.frame == frame {
                machine.set_input(press.button, true);
            }
            if press.frame + press.hold == frame {
                machine.set_input(press.button, false);
            }
        }
    }
}

fn parse_press(text: &str, buttons: &[InputButton]) -> Result<Press, FrontendError> {
    let bad = |reason: &str| FrontendError::InputScript {
        press: text.to_string(),
        reason: reason.to_string(),
    };

    let (name, timing) = text.rsplit_once('@').ok_or_else(|| bad("expected BUTTON@FRAME"))?;
    let (frame, hold) = match timing.split_once('+') {
        Some((frame, hold)) => (frame, Some(hold)),
        None => (timing, None),
    };
    let frame = frame.trim().parse().map_err(|_| bad("frame is not a number"))?;
    let hold = match hold {
        Some(hold) => hold.trim().parse().map_err(|_| bad("hold length is not a number"))?,
        None => DEFAULT_HOLD_FRAMES,
    };
    if hold == 0 {
        return Err(bad("hold length must be at least one frame"));
    }

    let button = find_button(name.trim(), buttons).ok_or_else(|| bad("unknown button"))?;
    Ok(Press { button, frame, hold })
}

fn find_button(name: &str, buttons: &[InputButton]) -> Option<u8> {
    let name = KEY_ALIASES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map_or(name, |&(_, button)| button);
    buttons
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
        .map(|b| b.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_machines::InvadersSystem;
    use invaders_machines::invaders::{INPUT_COIN, INPUT_P1_FIRE, INPUT_TILT};

    fn script(args: &[&str]) -> Result<InputScript, FrontendError> {
        let sys = InvadersSystem::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        InputScript::parse(&args, sys.input_map())
    }

    #[test]
    fn parses_names_and_aliases() {
        let s = script(&["Coin@10", "p1 fire@20+2", "t@0+1"]).unwrap();
        assert_eq!(
            s.presses(),
            &[
                Press { button: INPUT_COIN, frame: 10, hold: DEFAULT_HOLD_FRAMES },
                Press { button: INPUT_P1_FIRE, frame: 20, hold: 2 },
                Press { button: INPUT_TILT, frame: 0, hold: 1 },
            ]
        );
    }

    #[test]
    fn rejects_malformed_presses() {
        for bad in ["Coin", "Coin@x", "Coin@1+", "Coin@1+0", "Jump@5"] {
            assert!(
                matches!(script(&[bad]), Err(FrontendError::InputScript { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn apply_presses_then_releases() {
        let s = script(&["c@2+3"]).unwrap();
        let mut sys = InvadersSystem::new();

        let port1 = |sys: &InvadersSystem| sys.emulator().io.input(1);
        s.apply(&mut sys, 1);
        assert_eq!(port1(&sys), Some(0x08));
        s.apply(&mut sys, 2);
        assert_eq!(port1(&sys), Some(0x09));
        s.apply(&mut sys, 4);
        assert_eq!(port1(&sys), Some(0x09));
        s.apply(&mut sys, 5);
        assert_eq!(port1(&sys), Some(0x08));
    }
}
