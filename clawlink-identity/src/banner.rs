//! Terminal banner shown after registration.

use clawlink::CLAIM_CODE_TTL;

const WIDTH: usize = 44;

/// Renders the box that tells the human which code to type.
///
/// # Examples
///
/// ```
/// let banner = clawlink_identity::claim_banner("cbot_01h455vb4pex5vsknk084sn02q", "042917");
/// assert!(banner.contains("042917"));
/// assert!(banner.contains("Expires in 15 minutes"));
/// ```
#[must_use]
pub fn claim_banner(bot_id: &str, claim_code: &str) -> String {
    let minutes = CLAIM_CODE_TTL.as_secs() / 60;
    let lines = [
        String::new(),
        format!("Your claim code:  {claim_code}"),
        String::new(),
        "Enter this code in the clawlink app".to_string(),
        format!("Expires in {minutes} minutes"),
        String::new(),
        format!("Bot ID: {bot_id}"),
        String::new(),
    ];

    let inner = lines
        .iter()
        .map(|l| l.chars().count() + 4)
        .max()
        .unwrap_or(0)
        .max(WIDTH);
    let border = "=".repeat(inner);

    let mut out = format!("+{border}+\n");
    for line in &lines {
        out.push_str(&format!("|   {line:<width$} |\n", width = inner - 4));
    }
    out.push_str(&format!("+{border}+"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_aligned() {
        let banner = claim_banner("cbot_01h455vb4pex5vsknk084sn02q", "000123");
        let widths: Vec<usize> = banner.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn keeps_leading_zeros() {
        assert!(claim_banner("cbot_x", "000123").contains("000123"));
    }
}
