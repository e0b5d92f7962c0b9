use axum::response::Html;

/// Landing page for the authorize redirect.
///
/// The implicit grant puts the access token in the URL fragment, which never
/// reaches the server. This page moves the fragment into a query string and
/// forwards it to [`super::token`].
pub async fn callback() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
  <body>
    <p>Processing Spotify callback...</p>
    <script>
      const fragment = window.location.hash.substring(1);
      window.location.replace("/token?" + fragment);
    </script>
  </body>
</html>"#,
    )
}
