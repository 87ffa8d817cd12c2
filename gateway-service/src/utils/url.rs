/// Builds `<base>/<path>?q=<query>` with the query percent-encoded.
pub fn endpoint_url(base: &str, path: &str, query: &str) -> String {
    format!(
        "{}/{}?q={}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/'),
        urlencoding::encode(query)
    )
}
