use std::cmp::Ordering;
use std::io::{self, BufWriter, Write};

/// Buffered handle on stdout
pub fn stdout_writer() -> Box<dyn Write + Send> {
    let handle = io::stdout();
    let buffer = BufWriter::new(handle);
    Box::new(buffer)
}

/// Formats a count with thousands separators (e.g. `1,234,567`)
pub fn format_count(n: usize) -> String {
    let s = n.to_string();
    s.as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Orders names so that embedded numbers compare by value (`S2` before `S10`)
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_rest = a;
    let mut b_rest = b;
    loop {
        match (a_rest.is_empty(), b_rest.is_empty()) {
            (true, true) => return a.cmp(b),
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }

        let a_digits = a_rest.bytes().take_while(u8::is_ascii_digit).count();
        let b_digits = b_rest.bytes().take_while(u8::is_ascii_digit).count();

        let (a_len, b_len, ord) = if a_digits > 0 && b_digits > 0 {
            let a_num = a_rest[..a_digits].trim_start_matches('0');
            let b_num = b_rest[..b_digits].trim_start_matches('0');
            let ord = a_num.len().cmp(&b_num.len()).then_with(|| a_num.cmp(b_num));
            (a_digits, b_digits, ord)
        } else {
            // a digit against text compares as a single character
            let a_len = a_rest.bytes().take_while(|c| !c.is_ascii_digit()).count().max(1);
            let b_len = b_rest.bytes().take_while(|c| !c.is_ascii_digit()).count().max(1);
            let ord = a_rest.as_bytes()[..a_len].cmp(&b_rest.as_bytes()[..b_len]);
            (a_len, b_len, ord)
        };

        if ord != Ordering::Equal {
            return ord;
        }
        a_rest = &a_rest[a_len..];
        b_rest = &b_rest[b_len..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_grouped_by_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn numbers_sort_by_value() {
        let mut names = vec!["S10", "S2", "S1", "Unassigned", "S02_b"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["S1", "S2", "S02_b", "S10", "Unassigned"]);
    }

    #[test]
    fn equal_names_are_equal() {
        assert_eq!(natural_cmp("lib_7", "lib_7"), Ordering::Equal);
        assert_eq!(natural_cmp("lib", "lib_7"), Ordering::Less);
    }
}
