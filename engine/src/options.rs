use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// Player-facing settings that steer the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// How far the player can see.
    pub sight_radius: i32,
    /// Step limit of the monster pursuit field.
    pub flow_depth: i32,
    /// Step limit of the auto-travel field.
    pub travel_depth: i32,
    /// Extra flow cost of going through a closed door.
    pub door_penalty: i32,

    /// Remember plain floor seen by torchlight.
    pub remember_torch_lit: bool,
    /// Remember plain floor seen glowing.
    pub remember_glowing: bool,
    pub reduce_light_while_running: bool,

    /// Keep the player at the middle of the view panel.
    pub center_player: bool,
    pub panel_size: IVec2,
    /// Panel scrolling interrupts continuous actions.
    pub disturb_panel: bool,

    /// Monsters coming into or out of view interrupt.
    pub disturb_near: bool,
    /// Any visible monster moving interrupts.
    pub disturb_move: bool,
    /// Discard queued input when interrupted.
    pub flush_on_disturb: bool,

    pub run_ignore_stairs: bool,
    pub run_ignore_doors: bool,
    pub run_use_corners: bool,
    pub run_cut_corners: bool,

    /// Warn when hit points fall below this many tenths of maximum.
    pub hitpoint_warn: i32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            sight_radius: 20,
            flow_depth: 32,
            travel_depth: 64,
            door_penalty: 3,
            remember_torch_lit: true,
            remember_glowing: true,
            reduce_light_while_running: false,
            center_player: false,
            panel_size: ivec2(66, 22),
            disturb_panel: true,
            disturb_near: true,
            disturb_move: false,
            flush_on_disturb: false,
            run_ignore_stairs: true,
            run_ignore_doors: true,
            run_use_corners: true,
            run_cut_corners: true,
            hitpoint_warn: 3,
        }
    }
}

impl Options {
    /// Read options from IDM text, unmentioned options keep their
    /// defaults.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        // A lone option line only parses as a struct when terminated.
        if text.is_empty() || text.ends_with('\n') {
            Ok(idm::from_str(text)?)
        } else {
            Ok(idm::from_str(&format!("{text}\n"))?)
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_options() {
        let opts = Options::parse(
            "\
sight-radius 10
disturb-move true
panel-size 80 24",
        )
        .unwrap();

        assert_eq!(
            opts,
            Options {
                sight_radius: 10,
                disturb_move: true,
                panel_size: ivec2(80, 24),
                ..Default::default()
            }
        );
    }

    #[test]
    fn single_line_options() {
        let expected = Options {
            sight_radius: 10,
            ..Default::default()
        };
        assert_eq!(Options::parse("sight-radius 10").unwrap(), expected);
        assert_eq!(Options::parse("sight-radius 10\n").unwrap(), expected);
    }

    #[test]
    fn empty_options() {
        assert_eq!(Options::parse("").unwrap(), Options::default());
    }
}
