const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Highest representable pitch number.
pub const MAX_PITCH: u8 = 127;

/// Parse a pitch name such as `C4`, `f#3`, `Bb2`, `E♭5` or the key-style `c/4`.
///
/// Returns `None` when the name has no letter, no octave, or lands outside
/// the MIDI range.
pub fn pitch_from_name(name: &str) -> Option<u8> {
    let cleaned: String = name.trim().chars().filter(|c| *c != '/').collect();
    let mut chars = cleaned.chars().peekable();

    let letter = chars.next()?.to_ascii_uppercase();
    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let mut accidental = 0i32;
    while let Some(&c) = chars.peek() {
        match c {
            '#' | '♯' => accidental += 1,
            'b' | '♭' => accidental -= 1,
            _ => break,
        }
        chars.next();
    }

    let octave: i32 = chars.collect::<String>().parse().ok()?;
    let pitch = (octave + 1) * 12 + base + accidental;
    u8::try_from(pitch).ok().filter(|p| *p <= MAX_PITCH)
}

/// Render a pitch number as a sharp-spelled scientific name (`60` -> `C4`).
pub fn pitch_name(pitch: u8) -> String {
    let octave = i32::from(pitch / 12) - 1;
    format!("{}{}", SHARP_NAMES[usize::from(pitch % 12)], octave)
}

/// True for the five non-diatonic pitch classes (the black keys).
pub fn is_sharp(pitch: u8) -> bool {
    matches!(pitch % 12, 1 | 3 | 6 | 8 | 10)
}
