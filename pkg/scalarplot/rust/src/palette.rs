// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Line colors: parsing user-supplied colors and the default palette cycle.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// The "tab10" categorical palette.
pub const TAB10: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

const TAB_NAMES: [&str; 10] = [
    "blue", "orange", "green", "red", "purple", "brown", "pink", "gray", "olive", "cyan",
];

/// Hands out palette colors in a fixed order, wrapping around at the end.
#[derive(Debug, Clone, Default)]
pub struct ColorCycle {
    next: usize,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for ColorCycle {
    type Item = Rgb;

    fn next(&mut self) -> Option<Rgb> {
        let color = TAB10.get(self.next % TAB10.len()).copied();
        self.next += 1;
        color
    }
}

/// Parses `#rgb`, `#rrggbb`, `tab:<name>` and a handful of basic color names.
pub fn parse_color(text: &str) -> Option<Rgb> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }

    let name = text.to_ascii_lowercase();
    if let Some(tab) = name.strip_prefix("tab:") {
        return tab_color(tab);
    }

    let rgb = match name.as_str() {
        "black" | "k" => Rgb(0, 0, 0),
        "white" | "w" => Rgb(0xff, 0xff, 0xff),
        "red" | "r" => Rgb(0xff, 0, 0),
        "green" | "g" => Rgb(0, 0x80, 0),
        "blue" | "b" => Rgb(0, 0, 0xff),
        "yellow" | "y" => Rgb(0xff, 0xff, 0),
        "cyan" | "c" => Rgb(0, 0xff, 0xff),
        "magenta" | "m" => Rgb(0xff, 0, 0xff),
        "gray" | "grey" => Rgb(0x80, 0x80, 0x80),
        "orange" => Rgb(0xff, 0xa5, 0),
        "purple" => Rgb(0x80, 0, 0x80),
        "brown" => Rgb(0xa5, 0x2a, 0x2a),
        "pink" => Rgb(0xff, 0xc0, 0xcb),
        "olive" => Rgb(0x80, 0x80, 0),
        _ => return None,
    };
    Some(rgb)
}

fn tab_color(name: &str) -> Option<Rgb> {
    let name = if name == "grey" { "gray" } else { name };
    let index = TAB_NAMES.iter().position(|n| *n == name)?;
    TAB10.get(index).copied()
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |c: char| c.to_digit(16).and_then(|d| u8::try_from(d).ok());
    let chars: Vec<char> = hex.chars().collect();
    match chars.as_slice() {
        [r, g, b] => Some(Rgb(
            digit(*r)? * 17,
            digit(*g)? * 17,
            digit(*b)? * 17,
        )),
        [r1, r2, g1, g2, b1, b2] => Some(Rgb(
            digit(*r1)? * 16 + digit(*r2)?,
            digit(*g1)? * 16 + digit(*g2)?,
            digit(*b1)? * 16 + digit(*b2)?,
        )),
        _ => None,
    }
}
