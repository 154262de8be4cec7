use super::*;

fn session(client_name: Option<&str>, ip_address: Option<&str>) -> SessionItem {
    SessionItem {
        session_id: 4,
        token: "tok-alice".into(),
        ip_address: ip_address.map(str::to_owned),
        client_name: client_name.map(str::to_owned),
        created_at: "2024-05-01T10:00:00".into(),
        last_accessed: "2024-05-01T10:05:00".into(),
    }
}

#[test]
fn session_label_includes_ip_when_known() {
    assert_eq!(session_label(&session(Some("Firefox"), Some("10.0.0.1"))), "Firefox (10.0.0.1)");
}

#[test]
fn session_label_falls_back_for_missing_fields() {
    assert_eq!(session_label(&session(None, None)), "Unknown client");
    assert_eq!(session_label(&session(Some(""), Some(""))), "Unknown client");
}

#[test]
fn current_session_matches_held_token() {
    let item = session(None, None);
    assert!(is_current_session(&item, Some("tok-alice")));
    assert!(!is_current_session(&item, Some("tok-bob")));
    assert!(!is_current_session(&item, None));
}
