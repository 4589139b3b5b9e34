//! Spanish cardinal numbers.
//!
//! Long scale: millón (10^6), billón (10^12), trillón (10^18). Numbers that
//! end in "uno" drop the final vowel before "mil" and the million scales
//! ("un millón", "veintiún mil").

const UNITS: [&str; 30] = [
    "cero",
    "uno",
    "dos",
    "tres",
    "cuatro",
    "cinco",
    "seis",
    "siete",
    "ocho",
    "nueve",
    "diez",
    "once",
    "doce",
    "trece",
    "catorce",
    "quince",
    "dieciséis",
    "diecisiete",
    "dieciocho",
    "diecinueve",
    "veinte",
    "veintiuno",
    "veintidós",
    "veintitrés",
    "veinticuatro",
    "veinticinco",
    "veintiséis",
    "veintisiete",
    "veintiocho",
    "veintinueve",
];

const TENS: [&str; 10] = [
    "", "", "", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta", "noventa",
];

const HUNDREDS: [&str; 10] = [
    "",
    "ciento",
    "doscientos",
    "trescientos",
    "cuatrocientos",
    "quinientos",
    "seiscientos",
    "setecientos",
    "ochocientos",
    "novecientos",
];

const SCALES: [(&str, &str); 3] = [
    ("millón", "millones"),
    ("billón", "billones"),
    ("trillón", "trillones"),
];

const MILLION: u64 = 1_000_000;

/// Spell out `value` in Spanish, lowercase.
pub fn spanish_cardinal(value: u64) -> String {
    if value == 0 {
        return UNITS[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = value;
    while rest > 0 {
        groups.push(rest % MILLION);
        rest /= MILLION;
    }

    let mut parts = Vec::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        if scale == 0 {
            parts.push(below_million(group));
            continue;
        }
        let (singular, plural) = SCALES[scale - 1];
        if group == 1 {
            parts.push(format!("un {singular}"));
        } else {
            parts.push(format!("{} {plural}", apocopate(below_million(group))));
        }
    }

    parts.join(" ")
}

fn below_million(n: u64) -> String {
    let thousands = n / 1000;
    let rest = n % 1000;

    let mut parts = Vec::new();
    match thousands {
        0 => {}
        1 => parts.push("mil".to_string()),
        _ => parts.push(format!("{} mil", apocopate(below_thousand(thousands)))),
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

fn below_thousand(n: u64) -> String {
    if n == 100 {
        return "cien".to_string();
    }

    let hundreds = (n / 100) as usize;
    let rest = n % 100;

    let mut parts = Vec::new();
    if hundreds > 0 {
        parts.push(HUNDREDS[hundreds].to_string());
    }
    if rest > 0 {
        parts.push(below_hundred(rest));
    }
    parts.join(" ")
}

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < UNITS.len() {
        return UNITS[n].to_string();
    }
    match n % 10 {
        0 => TENS[n / 10].to_string(),
        unit => format!("{} y {}", TENS[n / 10], UNITS[unit]),
    }
}

/// "uno" becomes "un" in front of a noun ("veintiún mil", "treinta y un millones").
fn apocopate(words: String) -> String {
    if let Some(stem) = words.strip_suffix("veintiuno") {
        format!("{stem}veintiún")
    } else if let Some(stem) = words.strip_suffix("uno") {
        format!("{stem}un")
    } else {
        words
    }
}
