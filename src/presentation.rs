//! Stateless formatting of an analysis result into display primitives.

use crate::api::{AnalysisResult, DamageDetected};

// ── Severity ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    /// Anything the service reports that we don't recognize.
    Unknown,
}

impl Severity {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" => Severity::None,
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Unknown,
        }
    }

    pub fn color(self) -> egui::Color32 {
        match self {
            Severity::None => egui::Color32::from_rgb(0x9e, 0x9e, 0x9e),
            Severity::Low => egui::Color32::from_rgb(0x4c, 0xaf, 0x50),
            Severity::Medium => egui::Color32::from_rgb(0xff, 0x98, 0x00),
            Severity::High => egui::Color32::from_rgb(0xf4, 0x43, 0x36),
            Severity::Unknown => egui::Color32::from_rgb(0x75, 0x75, 0x75),
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::None => "✅",
            Severity::Low => "✓",
            Severity::Medium | Severity::High => "⚠",
            Severity::Unknown => "ℹ",
        }
    }
}

// ── Damage categories ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageKind {
    BrokenGlass,
    BrokenLights,
    Scratch,
    Dent,
    Crack,
    PuncturedTyre,
    LostParts,
    Torn,
    NonDamaged,
    /// Category outside the service's documented set.
    Other,
}

impl DamageKind {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "broken glass" => DamageKind::BrokenGlass,
            "broken lights" => DamageKind::BrokenLights,
            "scratch" => DamageKind::Scratch,
            "dent" => DamageKind::Dent,
            "crack" => DamageKind::Crack,
            "punctured tyre" => DamageKind::PuncturedTyre,
            "lost parts" => DamageKind::LostParts,
            "torn" => DamageKind::Torn,
            "non-damaged" => DamageKind::NonDamaged,
            _ => DamageKind::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            DamageKind::BrokenGlass => "🔨",
            DamageKind::BrokenLights => "💡",
            DamageKind::Scratch => "〰",
            DamageKind::Dent => "⚫",
            DamageKind::Crack => "⚡",
            DamageKind::PuncturedTyre => "🛞",
            DamageKind::LostParts => "🔧",
            DamageKind::Torn => "✂",
            DamageKind::NonDamaged => "✅",
            DamageKind::Other => "🔍",
        }
    }
}

// ── Result cards ────────────────────────────────────────────────────────────

pub fn show_results(ui: &mut egui::Ui, result: &AnalysisResult) {
    ui.heading("Analysis Results");
    ui.add_space(4.0);

    let detected = result.damage_detected == DamageDetected::Yes;

    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(if detected { "⚠" } else { "✅" });
            ui.strong("Damage Status");
        });
        ui.label(if detected {
            "Damage Detected"
        } else {
            "No Damage Detected"
        });
    });

    let severity = Severity::parse(&result.severity);
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(severity.icon());
            ui.strong("Severity Level");
        });
        ui.colored_label(severity.color(), &result.severity);
    });

    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label("🔍");
            ui.strong("Damage Type(s)");
        });
        ui.horizontal_wrapped(|ui| {
            for kind in &result.damage_type {
                ui.label(format!("{} {}", DamageKind::parse(kind).icon(), kind));
            }
        });
    });

    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label("📍");
            ui.strong("Damage Location");
        });
        ui.label(&result.damage_location);
    });

    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label("📝");
            ui.strong("Detailed Description");
        });
        ui.label(&result.description);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("Medium"), Severity::Medium);
        assert_eq!(Severity::parse("HIGH"), Severity::High);
        assert_eq!(Severity::parse("none"), Severity::None);
        assert_eq!(Severity::parse("Low"), Severity::Low);
    }

    #[test]
    fn unknown_severity_degrades_to_the_default() {
        let sev = Severity::parse("catastrophic");
        assert_eq!(sev, Severity::Unknown);
        assert_eq!(sev.color(), egui::Color32::from_rgb(0x75, 0x75, 0x75));
        assert_eq!(sev.icon(), "ℹ");
    }

    #[test]
    fn severity_colors_match_their_levels() {
        assert_eq!(
            Severity::Low.color(),
            egui::Color32::from_rgb(0x4c, 0xaf, 0x50)
        );
        assert_eq!(
            Severity::High.color(),
            egui::Color32::from_rgb(0xf4, 0x43, 0x36)
        );
    }

    #[test]
    fn damage_kinds_parse_from_service_strings() {
        assert_eq!(DamageKind::parse("Broken Glass"), DamageKind::BrokenGlass);
        assert_eq!(DamageKind::parse("scratch"), DamageKind::Scratch);
        assert_eq!(DamageKind::parse("Punctured Tyre"), DamageKind::PuncturedTyre);
        assert_eq!(DamageKind::parse("non-damaged"), DamageKind::NonDamaged);
    }

    #[test]
    fn unknown_damage_kind_gets_the_fallback_icon() {
        let kind = DamageKind::parse("rust spots");
        assert_eq!(kind, DamageKind::Other);
        assert_eq!(kind.icon(), "🔍");
    }
}
