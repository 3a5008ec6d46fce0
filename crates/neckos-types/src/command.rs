//! The ASCII motion-command grammar.
//!
//! A wire line is newline-terminated ASCII and may contain several
//! sub-commands separated by `|`.  Each sub-command is classified
//! independently into one of five forms:
//!
//! | Form | Example | Meaning |
//! |---|---|---|
//! | Home | `HOME`, `HOME_BRUTE`, `HOME_SOFT` | run the homing sequence |
//! | Health | `HEALTH`, `STATUS` | emit a status line, no motion |
//! | Quaternion | `Q:0.7071,0,0.7071,0,S1,A1` | absolute attitude target |
//! | Direct | `1:10,2:20` | per-stepper millimetre targets |
//! | General | `X10,Y-5,Z15,H30` | letter-keyed mixed movement |
//!
//! Parsing fails soft wherever the rig can still do something sensible: a
//! non-numeric value reads as `0`, empty tokens are skipped, and only a
//! quaternion with too few components or a degenerate norm rejects its whole
//! sub-command.  The firmware is last-write-wins, so a half-understood
//! command is preferable to a stalled one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::NeckError;

/// Squared-norm threshold below which a quaternion is considered degenerate.
const QUAT_NORM_EPSILON: f32 = 1e-8;

// ────────────────────────────────────────────────────────────────────────────
// Command forms
// ────────────────────────────────────────────────────────────────────────────

/// Which homing sequence to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomingMode {
    /// Two-stage overtravel (`HOME` / `HOME_BRUTE`).
    Brute,
    /// Single gentler overtravel (`HOME_SOFT`).
    Soft,
}

/// An absolute attitude target expressed as a raw (not yet normalized)
/// quaternion, plus optional height and speed/accel multipliers.
///
/// The parser guarantees the norm is not degenerate; normalization proper is
/// left to the consumer's attitude math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuaternionCommand {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Height offset in millimetres (`H` token, default 0).
    pub height_mm: f32,
    /// Speed multiplier (`S` token, default 1.0).
    pub speed: f32,
    /// Acceleration multiplier (`A` token, default 1.0).
    pub accel: f32,
}

/// The letter-keyed movement form.  Any field absent from the wire takes its
/// default *for that command only* – defaults never persist across commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralCommand {
    /// Yaw rotation term (`X`).
    pub angle_x: f32,
    /// Lateral translation term (`Y`).
    pub angle_y: f32,
    /// Front/back translation term (`Z`).
    pub angle_z: f32,
    /// Neck height in millimetres (`H`).
    pub height_mm: f32,
    /// Speed multiplier (`S`).
    pub speed: f32,
    /// Acceleration multiplier (`A`).
    pub accel: f32,
    /// Roll / tilt term (`R`).
    pub roll: f32,
    /// Pitch / chin-up term (`P`).
    pub pitch: f32,
}

impl Default for GeneralCommand {
    fn default() -> Self {
        Self {
            angle_x: 0.0,
            angle_y: 0.0,
            angle_z: 0.0,
            height_mm: 0.0,
            speed: 1.0,
            accel: 1.0,
            roll: 0.0,
            pitch: 0.0,
        }
    }
}

/// One parsed sub-command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a homing sequence.
    Home(HomingMode),
    /// Emit a health/status line; no motion.
    Health,
    /// Absolute attitude target.
    Quaternion(QuaternionCommand),
    /// Per-stepper millimetre targets as `(index, mm)` pairs.  Indices are
    /// kept exactly as parsed; range checking (and the skip log) happens at
    /// dispatch so the remaining pairs still apply.
    Direct(Vec<(i32, f32)>),
    /// Letter-keyed mixed movement.
    General(GeneralCommand),
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parse one wire line into its sub-commands.
///
/// The line is split on `|`; every sub-command is classified independently,
/// so a malformed quaternion in the middle of a line does not stop the
/// sub-commands after it.  Empty sub-commands (stray `||` or a trailing `|`)
/// are skipped.
pub fn parse_line(line: &str) -> Vec<Result<Command, NeckError>> {
    line.split('|')
        .filter_map(|sub| parse_subcommand(sub.trim()))
        .collect()
}

fn parse_subcommand(sub: &str) -> Option<Result<Command, NeckError>> {
    if sub.is_empty() {
        return None;
    }

    if sub.eq_ignore_ascii_case("HOME") || sub.eq_ignore_ascii_case("HOME_BRUTE") {
        return Some(Ok(Command::Home(HomingMode::Brute)));
    }
    if sub.eq_ignore_ascii_case("HOME_SOFT") {
        return Some(Ok(Command::Home(HomingMode::Soft)));
    }
    if sub.eq_ignore_ascii_case("HEALTH") || sub.eq_ignore_ascii_case("STATUS") {
        return Some(Ok(Command::Health));
    }

    // Quaternion form is checked before the direct form: both may contain a
    // colon, but only the quaternion form starts with `Q`.
    if sub.starts_with('Q') || sub.starts_with('q') {
        return Some(parse_quaternion(sub));
    }
    if sub.contains(':') {
        return Some(Ok(Command::Direct(parse_direct(sub))));
    }

    Some(Ok(Command::General(parse_general(sub))))
}

/// `Q`, optional `:`, then `w,x,y,z[,H<int>][,S<float>][,A<float>]`.
fn parse_quaternion(sub: &str) -> Result<Command, NeckError> {
    let body = sub[1..].strip_prefix(':').unwrap_or(&sub[1..]);
    let tokens: Vec<&str> = body.split(',').map(str::trim).collect();

    if tokens.len() < 4 {
        return Err(NeckError::MalformedQuaternion(format!(
            "expected w,x,y,z, got {} component(s)",
            tokens.len()
        )));
    }

    let w = parse_f32_or_zero(tokens[0]);
    let x = parse_f32_or_zero(tokens[1]);
    let y = parse_f32_or_zero(tokens[2]);
    let z = parse_f32_or_zero(tokens[3]);

    let norm_sq = w * w + x * x + y * y + z * z;
    if norm_sq < QUAT_NORM_EPSILON {
        return Err(NeckError::MalformedQuaternion(format!(
            "near-zero norm ({norm_sq:e})"
        )));
    }

    let mut cmd = QuaternionCommand {
        w,
        x,
        y,
        z,
        height_mm: 0.0,
        speed: 1.0,
        accel: 1.0,
    };

    for token in &tokens[4..] {
        let mut chars = token.chars();
        let Some(key) = chars.next() else { continue };
        let value = parse_f32_or_zero(chars.as_str());
        match key.to_ascii_uppercase() {
            'H' => cmd.height_mm = value,
            'S' => cmd.speed = value,
            'A' => cmd.accel = value,
            _ => {}
        }
    }

    Ok(Command::Quaternion(cmd))
}

/// Comma list of `<stepperIndex>:<millimetres>` pairs.  Tokens without a
/// colon are skipped.
fn parse_direct(sub: &str) -> Vec<(i32, f32)> {
    sub.split(',')
        .filter_map(|token| {
            let (index, mm) = token.trim().split_once(':')?;
            Some((
                index.trim().parse::<i32>().unwrap_or(0),
                parse_f32_or_zero(mm),
            ))
        })
        .collect()
}

/// Comma list of single-letter-prefixed fields `X,Y,Z,H,S,A,R,P`.  Empty and
/// unknown-letter tokens are skipped; a later duplicate letter overwrites an
/// earlier one.
fn parse_general(sub: &str) -> GeneralCommand {
    let mut cmd = GeneralCommand::default();

    for token in sub.split(',') {
        let token = token.trim();
        let mut chars = token.chars();
        let Some(key) = chars.next() else { continue };
        let value = parse_f32_or_zero(chars.as_str());
        match key {
            'X' => cmd.angle_x = value,
            'Y' => cmd.angle_y = value,
            'Z' => cmd.angle_z = value,
            'H' => cmd.height_mm = value,
            'S' => cmd.speed = value,
            'A' => cmd.accel = value,
            'R' => cmd.roll = value,
            'P' => cmd.pitch = value,
            _ => {}
        }
    }

    cmd
}

/// Fail-soft numeric parse: a non-numeric value reads as `0` so the rest of
/// the command still executes.
fn parse_f32_or_zero(s: &str) -> f32 {
    s.trim().parse::<f32>().unwrap_or(0.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Wire rendering
// ────────────────────────────────────────────────────────────────────────────

impl fmt::Display for GeneralCommand {
    /// Render the wire form: six rounded integer channels plus the two
    /// multipliers with one decimal digit, in the canonical
    /// `X,Y,Z,H,S,A,R,P` field order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X{},Y{},Z{},H{},S{:.1},A{:.1},R{},P{}",
            self.angle_x.round() as i64,
            self.angle_y.round() as i64,
            self.angle_z.round() as i64,
            self.height_mm.round() as i64,
            self.speed,
            self.accel,
            self.roll.round() as i64,
            self.pitch.round() as i64,
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Home(HomingMode::Brute) => write!(f, "HOME_BRUTE"),
            Command::Home(HomingMode::Soft) => write!(f, "HOME_SOFT"),
            Command::Health => write!(f, "HEALTH"),
            Command::Quaternion(q) => write!(
                f,
                "Q:{},{},{},{},H{},S{:.1},A{:.1}",
                q.w,
                q.x,
                q.y,
                q.z,
                q.height_mm.round() as i64,
                q.speed,
                q.accel,
            ),
            Command::Direct(pairs) => {
                for (i, (index, mm)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{index}:{mm}")?;
                }
                Ok(())
            }
            Command::General(g) => g.fmt(f),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Command {
        let mut cmds = parse_line(line);
        assert_eq!(cmds.len(), 1, "expected one sub-command from {line:?}");
        cmds.remove(0).expect("sub-command must parse")
    }

    // ── Classification ──────────────────────────────────────────────────────

    #[test]
    fn home_variants_are_case_insensitive() {
        assert_eq!(parse_one("HOME"), Command::Home(HomingMode::Brute));
        assert_eq!(parse_one("home"), Command::Home(HomingMode::Brute));
        assert_eq!(parse_one("HOME_BRUTE"), Command::Home(HomingMode::Brute));
        assert_eq!(parse_one("home_soft"), Command::Home(HomingMode::Soft));
    }

    #[test]
    fn health_and_status_map_to_health() {
        assert_eq!(parse_one("HEALTH"), Command::Health);
        assert_eq!(parse_one("status"), Command::Health);
    }

    #[test]
    fn pipe_separated_subcommands_parse_independently() {
        let cmds = parse_line("HOME|X10|HEALTH");
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0], Ok(Command::Home(HomingMode::Brute)));
        assert!(matches!(cmds[1], Ok(Command::General(_))));
        assert_eq!(cmds[2], Ok(Command::Health));
    }

    #[test]
    fn empty_subcommands_are_skipped() {
        assert!(parse_line("").is_empty());
        assert_eq!(parse_line("HOME||HEALTH|").len(), 2);
    }

    #[test]
    fn bad_subcommand_does_not_stop_later_ones() {
        let cmds = parse_line("Q:0,0,0,0|X5");
        assert_eq!(cmds.len(), 2);
        assert!(matches!(
            cmds[0],
            Err(NeckError::MalformedQuaternion(_))
        ));
        assert!(matches!(cmds[1], Ok(Command::General(_))));
    }

    // ── General form ────────────────────────────────────────────────────────

    #[test]
    fn general_command_parses_fields_and_defaults() {
        let Command::General(g) = parse_one("X10,Y-5,Z15,H30") else {
            panic!("expected general command");
        };
        assert_eq!(g.angle_x, 10.0);
        assert_eq!(g.angle_y, -5.0);
        assert_eq!(g.angle_z, 15.0);
        assert_eq!(g.height_mm, 30.0);
        assert_eq!(g.roll, 0.0);
        assert_eq!(g.pitch, 0.0);
        assert_eq!(g.speed, 1.0);
        assert_eq!(g.accel, 1.0);
    }

    #[test]
    fn general_defaults_do_not_persist_across_commands() {
        let Command::General(first) = parse_one("X100,S2.5") else {
            panic!("expected general command");
        };
        assert_eq!(first.angle_x, 100.0);
        assert_eq!(first.speed, 2.5);

        // A later command with only P set must see fresh defaults.
        let Command::General(second) = parse_one("P3") else {
            panic!("expected general command");
        };
        assert_eq!(second.angle_x, 0.0);
        assert_eq!(second.speed, 1.0);
        assert_eq!(second.pitch, 3.0);
    }

    #[test]
    fn general_skips_empty_and_unknown_tokens() {
        let Command::General(g) = parse_one("X10,,Q7,H5,") else {
            panic!("expected general command");
        };
        assert_eq!(g.angle_x, 10.0);
        assert_eq!(g.height_mm, 5.0);
    }

    #[test]
    fn general_non_numeric_value_reads_as_zero() {
        let Command::General(g) = parse_one("Xabc,H30") else {
            panic!("expected general command");
        };
        assert_eq!(g.angle_x, 0.0);
        assert_eq!(g.height_mm, 30.0);
    }

    #[test]
    fn general_duplicate_letter_takes_last_value() {
        let Command::General(g) = parse_one("X10,X20") else {
            panic!("expected general command");
        };
        assert_eq!(g.angle_x, 20.0);
    }

    // ── Quaternion form ─────────────────────────────────────────────────────

    #[test]
    fn quaternion_parses_components_and_tail() {
        let Command::Quaternion(q) = parse_one("Q:0.7071,0,0.7071,0,S1,A1") else {
            panic!("expected quaternion command");
        };
        assert!((q.w - 0.7071).abs() < 1e-6);
        assert!((q.y - 0.7071).abs() < 1e-6);
        assert_eq!(q.height_mm, 0.0);
        assert_eq!(q.speed, 1.0);
        assert_eq!(q.accel, 1.0);
    }

    #[test]
    fn quaternion_colon_is_optional() {
        let Command::Quaternion(q) = parse_one("Q1,0,0,0,H12") else {
            panic!("expected quaternion command");
        };
        assert_eq!(q.w, 1.0);
        assert_eq!(q.height_mm, 12.0);
    }

    #[test]
    fn quaternion_with_too_few_components_is_rejected() {
        let cmds = parse_line("Q:1,0,0");
        assert!(matches!(
            cmds[0],
            Err(NeckError::MalformedQuaternion(_))
        ));
    }

    #[test]
    fn quaternion_with_near_zero_norm_is_rejected() {
        let cmds = parse_line("Q:0,0,0,0");
        assert!(matches!(
            cmds[0],
            Err(NeckError::MalformedQuaternion(_))
        ));
    }

    // ── Direct form ─────────────────────────────────────────────────────────

    #[test]
    fn direct_command_parses_pairs() {
        let Command::Direct(pairs) = parse_one("1:10,9:5,2:20") else {
            panic!("expected direct command");
        };
        assert_eq!(pairs, vec![(1, 10.0), (9, 5.0), (2, 20.0)]);
    }

    #[test]
    fn direct_tokens_without_colon_are_skipped() {
        let Command::Direct(pairs) = parse_one("1:10,garbage,2:5.5") else {
            panic!("expected direct command");
        };
        assert_eq!(pairs, vec![(1, 10.0), (2, 5.5)]);
    }

    #[test]
    fn direct_bad_index_parses_to_zero() {
        // Index 0 is out of range and will be skipped (with a log) at
        // dispatch; parsing keeps it so the consumer can report it.
        let Command::Direct(pairs) = parse_one("x:10,2:5") else {
            panic!("expected direct command");
        };
        assert_eq!(pairs, vec![(0, 10.0), (2, 5.0)]);
    }

    // ── Wire rendering ──────────────────────────────────────────────────────

    #[test]
    fn general_display_uses_canonical_field_order() {
        let g = GeneralCommand {
            angle_x: 10.4,
            angle_y: -5.0,
            angle_z: 15.0,
            height_mm: 30.0,
            speed: 2.0,
            accel: 1.5,
            roll: -3.6,
            pitch: 7.0,
        };
        assert_eq!(g.to_string(), "X10,Y-5,Z15,H30,S2.0,A1.5,R-4,P7");
    }

    #[test]
    fn general_display_roundtrips_through_parser() {
        let g = GeneralCommand {
            angle_x: 42.0,
            angle_y: -7.0,
            angle_z: 3.0,
            height_mm: 12.0,
            speed: 1.5,
            accel: 0.5,
            roll: 9.0,
            pitch: -2.0,
        };
        let Command::General(back) = parse_one(&g.to_string()) else {
            panic!("expected general command");
        };
        assert_eq!(back, g);
    }

    #[test]
    fn home_display_roundtrips() {
        for mode in [HomingMode::Brute, HomingMode::Soft] {
            let rendered = Command::Home(mode).to_string();
            assert_eq!(parse_one(&rendered), Command::Home(mode));
        }
    }

    #[test]
    fn homing_mode_serde_roundtrip() {
        let json = serde_json::to_string(&HomingMode::Soft).unwrap();
        let back: HomingMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HomingMode::Soft);
    }
}
