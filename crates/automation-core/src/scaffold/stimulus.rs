//! Stimulus configuration: packages, controllers directory and example controller

use super::{BundlerType, PackageManager};
use crate::dsl::Actions;
use anyhow::{Context, Result};
use colored::Color;
use std::path::{Path, PathBuf};

/// Packages installed into the project
pub const STIMULUS_PACKAGES: &[&str] = &[
    "@hotwired/stimulus",
    "@hotwired/stimulus-webpack-helpers",
];

/// Import added to the frontend entry file
pub const CONTROLLERS_IMPORT: &str = "import \"./controllers\"\n";

pub const JAVASCRIPT_DIR: &str = "frontend/javascript";

const ESBUILD_INDEX: &str = r#"import { Application } from "@hotwired/stimulus"
import { identifierForContextKey } from "@hotwired/stimulus-webpack-helpers"

window.Stimulus = Application.start()

import controllers from "./**/*_controller.{js,js.rb}"

Object.entries(controllers).forEach(([filename, controller]) => {
  const identifier = identifierForContextKey(filename)

  if (identifier) {
    Stimulus.register(identifier, controller.default)
  }
})
"#;

const WEBPACK_INDEX: &str = r#"import { Application } from "@hotwired/stimulus"
import { definitionsFromContext } from "@hotwired/stimulus-webpack-helpers"

window.Stimulus = Application.start()
const context = require.context("./", true, /\.js$/)
Stimulus.load(definitionsFromContext(context))
"#;

pub const EXAMPLE_CONTROLLER: &str = r#"import { Controller } from "@hotwired/stimulus"
export default class extends Controller {
  connect() {
    console.log("Hello, Stimulus!", this.element)
  }
}
"#;

/// Body of `controllers/index.js` for a bundler
pub fn controllers_index(bundler: BundlerType) -> &'static str {
    match bundler {
        BundlerType::Esbuild => ESBUILD_INDEX,
        BundlerType::Webpack => WEBPACK_INDEX,
    }
}

pub fn controllers_dir() -> PathBuf {
    Path::new(JAVASCRIPT_DIR).join("controllers")
}

/// Add Stimulus to a project
///
/// Steps run in order and the first failure is returned as is; whatever
/// already happened stays in place.
pub fn configure_stimulus<A: Actions + ?Sized>(
    actions: &mut A,
    bundler: BundlerType,
    package_manager: PackageManager,
) -> Result<()> {
    let controllers = controllers_dir();

    actions.say("Installing Stimulus...", Some(Color::Green))?;
    let install = package_manager.add_command(STIMULUS_PACKAGES);
    actions
        .run_command(&install)
        .with_context(|| format!("Failed to install Stimulus packages with `{}`", install))?;

    actions.say(
        &format!("Adding Stimulus to \"{}/index.js\"...", JAVASCRIPT_DIR),
        Some(Color::Magenta),
    )?;
    actions
        .inject_import(CONTROLLERS_IMPORT)
        .context("Failed to import controllers in the frontend entry file")?;

    actions.say(
        &format!("Creating a `./{}` directory...", controllers.display()),
        Some(Color::Magenta),
    )?;
    actions
        .create_dir(&controllers)
        .with_context(|| format!("Failed to create {}", controllers.display()))?;

    let index = controllers.join("index.js");
    actions
        .append_file(&index, controllers_index(bundler))
        .with_context(|| format!("Failed to write {}", index.display()))?;

    actions.say(
        "Creating an example Stimulus Controller for you!...",
        Some(Color::Magenta),
    )?;
    let example = controllers.join("example_controller.js");
    actions
        .write_file(&example, EXAMPLE_CONTROLLER)
        .with_context(|| format!("Failed to write {}", example.display()))?;

    actions.say("Stimulus successfully added", Some(Color::Green))?;
    actions.say(
        &format!(
            "To start adding controllers, visit the `./{}/` directory",
            controllers.display()
        ),
        Some(Color::Blue),
    )?;
    actions.say(
        "Make sure your controllers follow the `[name]_controller.js` convention",
        Some(Color::Blue),
    )?;
    actions.say(
        "For further reading, check out \"https://stimulus.hotwired.dev/\"",
        Some(Color::Blue),
    )?;

    Ok(())
}
