//! Markup of the viewer's info panel: title, camera metadata and a key
//! reference.

use std::fmt::Write;

use crate::dom::{escape_attr, escape_text};
use crate::models::ExifMetadata;
use crate::ui::icons;

const KEY_REFERENCE: [(&str, &str); 6] = [
    ("Right, Space", "Next slide"),
    ("Left, Backspace", "Prev slide"),
    ("Down / Up", "Hide/show interface"),
    ("Escape", "Close"),
    ("+ / -", "Zoom in/out"),
    ("i", "Toggle info panel"),
];

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Shutter speed as `1/250 s`; exposures longer than two seconds, whose
/// reciprocal rounds to zero, print as whole seconds.
pub fn format_exposure(seconds: f64) -> String {
    let denominator = (1.0 / seconds).round();
    if denominator >= 1.0 {
        format!("1/{denominator} s")
    } else {
        format!("{} s", seconds.round())
    }
}

fn push_stat(out: &mut String, icon: &str, text: &str) {
    let _ = write!(out, "<div>{icon}<span>{text}</span></div>");
}

fn push_exif(out: &mut String, exif: &ExifMetadata) {
    if let Some(date) = &exif.date_time_original {
        let _ = write!(out, "<p class=\"obsidium-info-date\">{}</p>", escape_text(date));
    }

    out.push_str("<div class=\"obsidium-info-exif\">");
    if let Some(f) = exif.f_number.filter(|v| *v != 0.0) {
        push_stat(out, icons::APERTURE, &format!(" ƒ/{}", round_to(f, 1)));
    }
    if let Some(t) = exif.exposure_time.filter(|v| *v > 0.0) {
        push_stat(out, icons::EXPOSURE, &format!(" {}", format_exposure(t)));
    }
    if let Some(iso) = exif.iso.filter(|v| *v != 0.0) {
        push_stat(out, icons::ISO, &iso.round().to_string());
    }
    if let Some(focal) = exif.focal_length.filter(|v| *v != 0.0) {
        push_stat(out, icons::FOCAL_LENGTH, &format!("{} mm", focal.round()));
    }
    if let (Some(w), Some(h)) = (exif.image_width, exif.image_height) {
        if w != 0.0 && h != 0.0 {
            push_stat(out, icons::DIMENSIONS, &format!("{w} x {h}"));
        }
    }

    let camera = match (&exif.make, &exif.model) {
        (Some(make), Some(model)) => escape_text(&format!("{make} {model}")),
        _ => "Unknown".to_string(),
    };
    let _ = write!(
        out,
        "<div class=\"obsidium-info-exif-full\">{}<span>{camera}</span></div>",
        icons::CAMERA
    );
    let lens = exif
        .lens_model
        .as_deref()
        .map_or_else(|| "Unknown".to_string(), escape_text);
    let _ = write!(
        out,
        "<div class=\"obsidium-info-exif-full\">{}<span>{lens}</span></div>",
        icons::LENS
    );

    if let (Some(lat), Some(lon)) = (exif.latitude, exif.longitude) {
        if lat != 0.0 && lon != 0.0 {
            let href = escape_attr(&format!("https://www.google.com/maps/place/{lat},{lon}"));
            let _ = write!(
                out,
                "<div class=\"obsidium-info-gps\">{}<span><a href=\"{href}\" target=\"_blank\" \
                 tabindex=\"-1\">View on map</a></span></div>",
                icons::LOCATION
            );
        }
    }
    out.push_str("</div>");
}

/// Builds the panel. Without metadata the EXIF section is left out.
pub fn info_markup(title: Option<&str>, exif: Option<&ExifMetadata>) -> String {
    let mut out = String::new();
    if let Some(title) = title {
        let _ = write!(
            out,
            "<p class=\"obsidium-info-headings\">{}</p>",
            escape_text(title)
        );
    }
    if let Some(exif) = exif {
        push_exif(&mut out, exif);
    }

    out.push_str("<div class=\"obsidium-info-keybindings\">");
    for (keys, action) in KEY_REFERENCE {
        let _ = write!(
            out,
            "<p><span class=\"obsidium-info-key\">{}</span>: {action}</p>",
            escape_text(keys)
        );
    }
    out.push_str("</div>");
    out
}
