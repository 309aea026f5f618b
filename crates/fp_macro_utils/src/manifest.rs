use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// Locate the [`syn::Path`] under which a workspace crate is reachable from
/// the crate currently being compiled.
///
/// Derive macros emit absolute paths, and those paths must be valid from the
/// invoking crate, which may depend on `fp_ptr` directly, through the
/// `ferroptr` facade, or under a renamed key.
///
/// # Example
///
/// ```rust
/// # use fp_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("fp_ptr"));
/// ```
///
/// Reading the manifest is not free. Call this once per macro invocation and
/// pass the path around.
///
/// # Resolution rules
///
/// 1. If the requested crate is a key of `dependencies`, return `::crate_name`.
/// 2. If a `dependencies` entry renames the requested crate via
///    `package = "crate_name"`, return `::key`.
/// 3. If the requested crate name begins with `fp_` and `ferroptr` is a
///    dependency, return `::ferroptr::short_name`
///    (e.g. `fp_ptr` -> `::ferroptr::ptr`).
/// 4. Repeat steps 1-3 in `dev-dependencies`.
/// 5. Otherwise, fall back to the absolute path `::crate_name`.
///
/// ## Note
///
/// A crate referencing its own derive output sees `::crate_name`, which only
/// resolves if the crate root declares `extern crate self as crate_name;`.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "ferroptr";
const CRATE_PREFIX: &str = "fp_";

impl Manifest {
    // Path of the invoking crate's `Cargo.toml`.
    #[inline(never)]
    fn get_manifest_path() -> PathBuf {
        env::var_os("CARGO_MANIFEST_DIR")
            .map(|path| {
                let mut path = PathBuf::from(path);
                path.push("Cargo.toml");
                assert!(
                    path.exists(),
                    "Cargo manifest does not exist at path {}",
                    path.display(),
                );
                path
            })
            .expect("CARGO_MANIFEST_DIR should be auto-defined by cargo.")
    }

    #[inline(never)]
    fn get_manifest_modified_time(
        cargo_manifest_path: &Path,
    ) -> Result<SystemTime, std::io::Error> {
        std::fs::metadata(cargo_manifest_path).and_then(|metadata| metadata.modified())
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Document<Box<str>> {
        let manifest = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()))
            .into_boxed_str();
        Document::parse(manifest)
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()))
    }

    #[inline]
    fn parse_str<T: syn::parse::Parse>(path: &str) -> T {
        syn::parse_str(path)
            .unwrap_or_else(|_| panic!("`{path}` is not a valid path"))
    }

    // The key under which `deps` lists `name`, following `package` renames.
    fn dependency_key<'t>(deps: &'t Table, name: &'t str) -> Option<&'t str> {
        if deps.contains_key(name) {
            return Some(name);
        }
        deps.iter().find_map(|(key, item)| {
            let package = item.get("package")?.as_str()?;
            (package == name).then_some(key)
        })
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if let Some(key) = Self::dependency_key(deps, name) {
            // Cargo turns `-` into `_` for the extern crate name.
            return Some(Self::parse_str(&format!("::{}", key.replace('-', "_"))));
        }

        let module = name.strip_prefix(CRATE_PREFIX)?;
        let facade = Self::dependency_key(deps, FACADE_NAME)?;
        let mut path = Self::parse_str::<syn::Path>(&format!("::{}", facade.replace('-', "_")));
        path.segments.push(Self::parse_str(module));
        Some(path)
    }

    /// Return a [`syn::Path`] for the package named `name` as resolved from this
    /// crate's Cargo.toml. See the top-level documentation for the resolution
    /// order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        for table in ["dependencies", "dev-dependencies"] {
            if let Some(Item::Table(deps)) = self.manifest.get(table)
                && let Some(path) = Self::find_in_deps(deps, name)
            {
                return path;
            }
        }

        Self::parse_str(&format!("::{name}"))
    }

    /// Obtain the [`Manifest`] of the caller's Cargo.toml.
    ///
    /// Parsed manifests are cached per path and reparsed only when the file's
    /// modified time changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let manifest_path = Self::get_manifest_path();
        let modified_time = Self::get_manifest_modified_time(&manifest_path)
            .expect("The Cargo.toml should have a modified time.");

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(manifest) = manifests.get(&manifest_path)
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }

        drop(manifests);

        let manifest = Manifest {
            manifest: Self::read_manifest(&manifest_path),
            modified_time,
        };

        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(manifest_path, manifest);

        result
    }
}
