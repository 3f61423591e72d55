pub fn print_success(json_mode: bool, payload: &serde_json::Value) {
    if json_mode {
        let envelope = serde_json::json!({
            "ok": true,
            "result": payload,
        });
        println!("{envelope}");
        return;
    }

    if let Some(rendered) = render_cards(payload) {
        print!("{rendered}");
        return;
    }

    if let Some(message) = payload.as_str() {
        println!("{message}");
        return;
    }

    match serde_json::to_string_pretty(payload) {
        Ok(rendered) => println!("{rendered}"),
        Err(_) => println!("{payload}"),
    }
}

pub fn print_error(json_mode: bool, message: &str, exit_code: i32) {
    if json_mode {
        let envelope = serde_json::json!({
            "ok": false,
            "error": {
                "message": message,
                "code": exit_code,
            }
        });
        eprintln!("{envelope}");
        return;
    }

    eprintln!("error: {message}");
}

/// Human layout for a generation response. `None` when the payload has no cards.
fn render_cards(payload: &serde_json::Value) -> Option<String> {
    let cards = payload.get("cards")?.as_array()?;
    let topic = payload.get("topic").and_then(|t| t.as_str()).unwrap_or("");

    let mut out = format!("{topic} ({} cards)\n", cards.len());
    for (i, card) in cards.iter().enumerate() {
        let question = card.get("question").and_then(|q| q.as_str()).unwrap_or("");
        let answer = card.get("answer").and_then(|a| a.as_str()).unwrap_or("");
        out.push_str(&format!("\n{}. Q: {question}\n   A: {answer}\n", i + 1));
    }
    if let Some(source) = payload.get("source_info").and_then(|s| s.as_str()) {
        out.push_str(&format!("\nsource: {source}\n"));
    }
    Some(out)
}
