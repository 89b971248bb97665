use std::{path::PathBuf, sync::LazyLock};

pub static DEFAULT_APP_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    let mut path = dirs::home_dir().unwrap_or_default();

    if std::env::var("TAGMOD_XDG_PATH").is_ok() {
        path.push(".config")
    }

    path.push("TagMod");
    path
});

/// Computes a path inside the TagMod app directory.
///
/// Returns a `&Path` referencing the app directory itself if no arguments are passed in, or a
/// `PathBuf` created by joining all of the arguments to the base directory if at least one
/// argument is passed in.
///
/// # Examples
///
/// ```
/// // Assuming `TAGMOD_XDG_PATH` is not set, the default app path is ~/TagMod
/// let home = dirs::home_dir().unwrap_or_default();
/// assert_eq!(tagmod_rust::app_path!(), home.join("TagMod").as_path());
/// assert_eq!(tagmod_rust::app_path!("logs"), home.join("TagMod").join("logs"));
/// ```
#[macro_export]
macro_rules! app_path {
    () => {
        $crate::paths::DEFAULT_APP_PATH.as_path()
    };

    ( $( $path:expr ),+ $(,)? ) => {
        [
            $crate::paths::DEFAULT_APP_PATH.as_path(),
            $( std::path::Path::new(&$path) ),+
        ].into_iter().collect::<std::path::PathBuf>()
    };
}
