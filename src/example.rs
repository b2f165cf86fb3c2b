//! The demonstration manager
//!
//! Adds a tabbed "Haricot Example" manager to the category edit screen with
//! one control of every type.

use crate::error::Result;
use crate::hooks::{run_registration, Registrar};
use crate::registry::Manager;
use crate::sanitize::BuiltinSanitizer;
use crate::schema::{Choice, Control, ControlType, Section, Setting};
use crate::value::ValueType;

pub const MANAGER_ID: &str = "hrct_example";
pub const CONTEXT: &str = "category";

/// Registrar for the demonstration manager.
#[derive(Debug, Clone)]
pub struct HaricotExample {
    /// Prefix for radio-image thumbnails, with a trailing slash
    pub image_base: String,
}

impl Default for HaricotExample {
    fn default() -> Self {
        Self {
            image_base: "images/".to_string(),
        }
    }
}

impl HaricotExample {
    pub fn with_image_base(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { image_base: base }
    }

    fn thumb(&self, name: &str) -> String {
        format!("{}{}-thumb.jpg", self.image_base, name)
    }
}

/// An empty manager shaped like the example's.
pub fn empty_manager() -> Manager {
    Manager::new(MANAGER_ID, "Haricot Example").with_contexts([CONTEXT])
}

/// Build and freeze the full example manager.
pub fn manager() -> Result<Manager> {
    let mut manager = empty_manager();
    run_registration(&mut manager, &[&HaricotExample::default()], CONTEXT)?;
    manager.freeze();
    Ok(manager)
}

impl Registrar for HaricotExample {
    fn register_sections(&self, manager: &mut Manager, context: &str) -> Result<()> {
        if context != CONTEXT {
            return Ok(());
        }

        let sections = [
            ("hrct_text_fields", "Text Fields", "dashicons-edit"),
            ("hrct_common_fields", "Common Fields", "dashicons-admin-generic"),
            ("hrct_color_fields", "Color Fields", "dashicons-art"),
            ("hrct_radio_fields", "Radio Fields", "dashicons-carrot"),
            ("hrct_special_fields", "Special Fields", "dashicons-star-filled"),
        ];
        for (id, label, icon) in sections {
            manager.register_section(Section::new(id, label).with_icon(icon))?;
        }
        Ok(())
    }

    fn register_settings(&self, manager: &mut Manager, context: &str) -> Result<()> {
        if context != CONTEXT {
            return Ok(());
        }

        manager.register_setting(
            Setting::string("hrct_text_a")
                .with_sanitizer(BuiltinSanitizer::StripTags)
                .with_default("yay"),
        )?;
        manager.register_setting(
            Setting::string("hrct_textarea_a")
                .with_sanitizer(BuiltinSanitizer::KsesPost)
                .with_default("Hello world"),
        )?;
        manager.register_setting(
            Setting::new("hrct_checkbox_a", ValueType::Boolean)
                .with_sanitizer(BuiltinSanitizer::Boolean),
        )?;
        manager.register_setting(
            Setting::new("hrct_checkboxes_a", ValueType::StringList)
                .with_sanitizer(BuiltinSanitizer::Key),
        )?;
        manager.register_setting(
            Setting::string("hrct_radio_a").with_sanitizer(BuiltinSanitizer::Key),
        )?;
        manager.register_setting(
            Setting::string("hrct_radio_image_a")
                .with_sanitizer(BuiltinSanitizer::Key)
                .with_default("planet-burst"),
        )?;
        manager.register_setting(
            Setting::string("hrct_select_a").with_sanitizer(BuiltinSanitizer::Key),
        )?;
        manager.register_setting(
            Setting::string("hrct_select_b").with_sanitizer(BuiltinSanitizer::Key),
        )?;
        // Dates parse on their own, no sanitizer needed.
        manager.register_setting(Setting::new("hrct_date_a", ValueType::Date))?;
        manager.register_setting(
            Setting::string("hrct_color_a")
                .with_sanitizer(BuiltinSanitizer::HexColorNoHash)
                .with_default("#232323"),
        )?;
        manager.register_setting(
            Setting::string("hrct_palette_a").with_sanitizer(BuiltinSanitizer::Key),
        )?;
        manager.register_setting(
            Setting::string("hrct_image_a").with_sanitizer(BuiltinSanitizer::Absint),
        )?;
        Ok(())
    }

    fn register_controls(&self, manager: &mut Manager, context: &str) -> Result<()> {
        if context != CONTEXT {
            return Ok(());
        }

        manager.register_control(
            Control::new("hrct_text_a", "hrct_text_fields", ControlType::Text)
                .attr("class", "widefat")
                .label("Example Text")
                .description("Example description."),
        )?;

        manager.register_control(
            Control::new("hrct_textarea_a", "hrct_text_fields", ControlType::Textarea)
                .attr("class", "widefat")
                .label("Example Textarea")
                .description("Example description."),
        )?;

        manager.register_control(
            Control::new("hrct_checkbox_a", "hrct_common_fields", ControlType::Checkbox)
                .label("Example Checkbox")
                .description("Example description."),
        )?;

        manager.register_control(
            Control::new("hrct_checkboxes_a", "hrct_common_fields", ControlType::Checkboxes)
                .label("Example Checkbox")
                .description("Example description.")
                .options([
                    ("choice_d", "Choice D"),
                    ("choice_e", "Choice E"),
                    ("choice_f", "Choice F"),
                ]),
        )?;

        manager.register_control(
            Control::new("hrct_radio_a", "hrct_radio_fields", ControlType::Radio)
                .label("Example Radio")
                .description("Example description.")
                .options([
                    ("", "None"),
                    ("choice_a", "Choice A"),
                    ("choice_b", "Choice B"),
                    ("choice_c", "Choice C"),
                ]),
        )?;

        manager.register_control(
            Control::new("hrct_select_a", "hrct_common_fields", ControlType::Select)
                .label("Example Select")
                .description("Example description.")
                .options([
                    ("", ""),
                    ("choice_x", "Choice X"),
                    ("choice_y", "Choice Y"),
                    ("choice_z", "Choice Z"),
                ]),
        )?;

        manager.register_control(
            Control::new("hrct_select_b", "hrct_common_fields", ControlType::SelectGrouped)
                .label("Example Select B")
                .description("Example description.")
                .choices([
                    Choice::option("", ""),
                    Choice::group(
                        "Citrus",
                        [
                            ("grapefruit", "Grapefruit"),
                            ("lemon", "Lemon"),
                            ("lime", "Lime"),
                            ("orange", "Orange"),
                        ],
                    ),
                    Choice::group(
                        "Melons",
                        [
                            ("banana-melon", "Banana"),
                            ("cantaloupe", "Cantaloupe"),
                            ("honeydew", "Honeydew"),
                            ("watermelon", "Watermelon"),
                        ],
                    ),
                ]),
        )?;

        manager.register_control(
            Control::new("hrct_color_a", "hrct_color_fields", ControlType::Color)
                .label("Pick a color")
                .description("Example description."),
        )?;

        manager.register_control(
            Control::new("hrct_palette_a", "hrct_color_fields", ControlType::Palette)
                .label("Pick a color palette")
                .description("Example description.")
                .choices([
                    Choice::swatch(
                        "cilantro",
                        "Cilantro",
                        ["99ce15", "389113", "BDE066", "DB412C"],
                    ),
                    Choice::swatch(
                        "quench",
                        "Quench",
                        ["#ffffff", "#7cc7dc", "#60A4B9", "#a07096"],
                    ),
                    Choice::swatch(
                        "cloudy-days",
                        "Cloudy Days",
                        ["#E2735F", "#eaa16e", "#FBDF8B", "#ffe249"],
                    ),
                ]),
        )?;

        let images = [
            ("horizon", "Horizon"),
            ("orange-burn", "Orange Burn"),
            ("planet-burst", "Planet Burst"),
            ("planets-blue", "Blue Planets"),
            ("space-splatters", "Space Splatters"),
        ];
        manager.register_control(
            Control::new("hrct_radio_image_a", "hrct_radio_fields", ControlType::RadioImage)
                .label("Example Radio Image")
                .description("Example description.")
                .choices(
                    images
                        .iter()
                        .map(|(value, label)| Choice::image(*value, *label, self.thumb(value))),
                ),
        )?;

        manager.register_control(
            Control::new("hrct_image_a", "hrct_special_fields", ControlType::Image)
                .label("Example Image")
                .description("Example description.")
                .attr("size", "thumbnail"),
        )?;

        manager.register_control(
            Control::new("hrct_date_a", "hrct_special_fields", ControlType::Datetime)
                .label("Example Date")
                .description("Example description."),
        )?;

        Ok(())
    }
}
