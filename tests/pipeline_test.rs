//! End-to-end generation against real directory trees.

mod support;

use bunpack::{generate, GenerateRequest, PackError, RealFileSystem};
use std::fs;
use support::NextProject;

fn request_for(project: &NextProject) -> GenerateRequest {
    GenerateRequest::for_project(project.root().to_path_buf(), None)
}

#[test]
fn test_flat_layout_registry_and_bootstrap() {
    let project = NextProject::flat();
    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();

    assert_eq!(report.server_root, project.standalone());
    assert_eq!(report.static_assets, 2);
    assert_eq!(report.public_assets, 2);
    assert_eq!(report.runtime_assets, 2);

    let registry = project.read(".next/standalone/assets.generated.js");
    assert!(registry.contains("\"/_next/static/chunks/main-abc.js\""));
    assert!(registry.contains("\"/_next/static/css/app.css\""));
    assert!(registry.contains("\"/favicon.ico\""));
    assert!(registry.contains("\"/images/logo.svg\""));
    assert!(registry.contains("\"/__bunpack/.next/BUILD_ID\""));
    assert!(registry.contains("\"/__bunpack/.next/server/pages/index.html\""));
    assert!(registry.contains("from \"../static/chunks/main-abc.js\" with { type: \"file\" };"));
    assert!(registry.contains("from \"../../public/favicon.ico\" with { type: \"file\" };"));
    assert!(!registry.contains("fetch-cache"));

    let bootstrap = project.read(".next/standalone/server-entry.js");
    assert!(bootstrap.contains("import { assets } from \"./assets.generated.js\";"));
    assert!(bootstrap.contains(
        "const nextConfig = {\"env\":{},\"distDir\":\"./.next\",\"output\":\"standalone\"};"
    ));
    assert!(bootstrap.contains("\"/_next/static/css/app.css\": \".next/static/css/app.css\","));
    assert!(bootstrap.contains("\"/images/logo.svg\": \"public/images/logo.svg\","));
    assert!(bootstrap.contains("\"/__bunpack/.next/BUILD_ID\": \".next/BUILD_ID\","));
}

#[test]
fn test_monorepo_depth_two() {
    let project = NextProject::with_app_dir("apps/web");
    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();

    assert_eq!(report.server_root, project.standalone().join("apps/web"));
    assert!(project.exists(".next/standalone/apps/web/assets.generated.js"));
    assert!(project.exists(".next/standalone/apps/web/server-entry.js"));
    assert!(!project.exists(".next/standalone/assets.generated.js"));
    assert!(!project.exists(".next/standalone/server-entry.js"));

    let registry = project.read(".next/standalone/apps/web/assets.generated.js");
    assert!(registry.contains("\"/__bunpack/.next/BUILD_ID\""));
    assert!(!registry.contains("/__bunpack/apps/web"));
    assert!(registry.contains("from \"./.next/BUILD_ID\""));
    assert!(registry.contains("from \"../../../static/chunks/main-abc.js\""));
}

#[test]
fn test_monorepo_depth_three() {
    let project = NextProject::with_app_dir("packages/frontend/site");
    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();

    assert_eq!(
        report.server_root,
        project.standalone().join("packages/frontend/site")
    );
    assert_eq!(report.runtime_assets, 2);
    assert!(project.exists(".next/standalone/packages/frontend/site/server-entry.js"));
}

#[test]
fn test_server_inside_node_modules_is_ignored() {
    let project = NextProject::empty();
    project.write(".next/standalone/node_modules/some-pkg/server.js", "const nextConfig = {}");

    let err = generate(&RealFileSystem, &request_for(&project)).unwrap_err();
    assert!(matches!(err, PackError::ServerNotFound { .. }));
}

#[test]
fn test_missing_server_writes_nothing() {
    let project = NextProject::empty();
    project.write(".next/standalone/apps/web/package.json", "{}");
    project.write("public/favicon.ico", "ico");

    let err = generate(&RealFileSystem, &request_for(&project)).unwrap_err();
    assert!(matches!(err, PackError::ServerNotFound { .. }));
    assert!(!project.exists(".next/standalone/assets.generated.js"));
    assert!(!project.exists(".next/standalone/server-entry.js"));
    assert!(!project.exists(".next/standalone/node_modules"));
}

#[test]
fn test_missing_standalone_dir() {
    let project = NextProject::empty();
    let err = generate(&RealFileSystem, &request_for(&project)).unwrap_err();
    assert!(matches!(err, PackError::StandaloneNotFound(_)));
}

#[test]
fn test_server_without_config_line_fails_before_mutation() {
    let project = NextProject::empty();
    project.write(".next/standalone/server.js", "require('next')\n");

    let err = generate(&RealFileSystem, &request_for(&project)).unwrap_err();
    assert!(matches!(err, PackError::ConfigExtractionFailed { .. }));
    assert!(!project.exists(".next/standalone/node_modules"));
    assert!(!project.exists(".next/standalone/server-entry.js"));
}

#[test]
fn test_generation_is_idempotent() {
    let project = NextProject::with_app_dir("apps/web");
    project.add_traced_internals("apps/web");
    let request = request_for(&project);

    generate(&RealFileSystem, &request).unwrap();
    let registry = project.read(".next/standalone/apps/web/assets.generated.js");
    let bootstrap = project.read(".next/standalone/apps/web/server-entry.js");

    fs::remove_file(project.path(".next/standalone/apps/web/assets.generated.js")).unwrap();
    fs::remove_file(project.path(".next/standalone/apps/web/server-entry.js")).unwrap();

    let second = generate(&RealFileSystem, &request).unwrap();
    assert_eq!(second.stubs_written, 0);
    assert_eq!(second.patches_applied, 0);
    assert_eq!(project.read(".next/standalone/apps/web/assets.generated.js"), registry);
    assert_eq!(project.read(".next/standalone/apps/web/server-entry.js"), bootstrap);
}

#[test]
fn test_cdn_prefix_omits_static_only() {
    let project = NextProject::flat();
    project.write(
        ".next/bun-compile-ctx.json",
        r#"{"distDir":".next","projectDir":".","assetPrefix":"https://cdn.example.com"}"#,
    );

    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();
    assert_eq!(report.static_assets, 0);
    assert_eq!(report.skipped_static, 2);
    assert_eq!(report.public_assets, 2);
    assert_eq!(report.runtime_assets, 2);

    let registry = project.read(".next/standalone/assets.generated.js");
    assert!(!registry.contains("/_next/static/"));
    assert!(registry.contains("\"/favicon.ico\""));
    assert!(registry.contains("\"/__bunpack/.next/BUILD_ID\""));
}

#[test]
fn test_blank_asset_prefix_embeds_static() {
    let project = NextProject::flat();
    project.write(
        ".next/bun-compile-ctx.json",
        r#"{"distDir":".next","projectDir":".","assetPrefix":"  "}"#,
    );

    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();
    assert_eq!(report.static_assets, 2);
    assert_eq!(report.skipped_static, 0);
}

#[test]
fn test_traced_modules_mirror_under_server_root() {
    let project = NextProject::with_app_dir("apps/web");
    project.add_traced_internals("apps/web");

    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();
    assert_eq!(report.external_modules, 5);

    let mirror = ".next/standalone/apps/web/.next/__external/next";
    assert!(project.exists(&format!("{}/package.json", mirror)));
    assert!(project.exists(&format!("{}/dist/server/lib/trace/tracer.js", mirror)));
    assert!(project.exists(&format!("{}/dist/server/lib/trace/constants.js", mirror)));
    assert!(project.exists(&format!("{}/dist/shared/lib/utils/index.js", mirror)));
    assert!(project.exists(&format!("{}/dist/shared/lib/utils/package.json", mirror)));
    assert!(!project.exists(".next/standalone/.next/__external"));

    let registry = project.read(".next/standalone/apps/web/assets.generated.js");
    assert!(registry.contains("\"/__bunpack/.next/__external/next/dist/server/lib/trace/tracer.js\""));

    let bootstrap = project.read(".next/standalone/apps/web/server-entry.js");
    assert!(bootstrap.contains(
        "\"/__bunpack/.next/__external/next/package.json\": \"node_modules/next/package.json\","
    ));
    assert!(bootstrap.contains("\"/__bunpack/.next/BUILD_ID\": \".next/BUILD_ID\","));
}

#[test]
fn test_stubs_written_but_never_overwritten() {
    let project = NextProject::flat();
    let existing = ".next/standalone/node_modules/next/dist/server/dev/next-dev-server.js";
    project.write(existing, "module.exports = 'real';");

    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();
    assert_eq!(project.read(existing), "module.exports = 'real';");
    assert!(report.stubs_written >= 1);
    assert!(project.exists(".next/standalone/node_modules/critters/index.js"));
    assert!(project.exists(
        ".next/standalone/node_modules/next/dist/server/lib/router-utils/setup-dev-bundler.js"
    ));
}

#[test]
fn test_require_hook_patched_once() {
    let project = NextProject::flat();
    let hook = ".next/standalone/node_modules/next/dist/server/require-hook.js";
    project.write(
        hook,
        "const resolve = process.env.NEXT_MINIMAL ? __non_webpack_require__.resolve : require.resolve;\nmodule.exports = resolve;\n",
    );

    let first = generate(&RealFileSystem, &request_for(&project)).unwrap();
    assert_eq!(first.patches_applied, 1);
    let patched = project.read(hook);
    assert!(patched.contains("__bunpackResolve"));

    let second = generate(&RealFileSystem, &request_for(&project)).unwrap();
    assert_eq!(second.patches_applied, 0);
    assert_eq!(project.read(hook), patched);
}

#[test]
fn test_custom_dist_dir() {
    let project = NextProject::empty();
    project.write("build/standalone/server.js", support::SERVER_JS);
    project.write("build/static/chunks/a.js", "a");

    let request = GenerateRequest::for_project(
        project.root().to_path_buf(),
        Some(project.path("build")),
    );
    let report = generate(&RealFileSystem, &request).unwrap();

    assert_eq!(report.server_root, project.path("build/standalone"));
    assert_eq!(report.static_assets, 1);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlinks_do_not_drop_asset_sets() {
    use std::os::unix::fs::symlink;

    let project = NextProject::flat();
    symlink("/nonexistent/target", project.path("public/dangling.png")).unwrap();
    symlink("/nonexistent/target", project.path(".next/standalone/.next/stale-link")).unwrap();
    symlink("/nonexistent/target", project.path(".next/static/chunks/gone.js")).unwrap();

    let report = generate(&RealFileSystem, &request_for(&project)).unwrap();
    assert_eq!(report.public_assets, 2);
    assert_eq!(report.runtime_assets, 2);
    assert_eq!(report.static_assets, 2);

    let registry = project.read(".next/standalone/assets.generated.js");
    assert!(registry.contains("\"/__bunpack/.next/BUILD_ID\""));
    assert!(!registry.contains("dangling.png"));
    assert!(!registry.contains("stale-link"));
}
