//! Synthetic fixture generation: on-disk source trees for the scanner
//! benchmark, and pre-built `FileIndex`es (skipping the parser entirely)
//! for the call-graph and confidence benchmarks, which only care about
//! downstream volume, not parsing cost.

use std::path::Path;

use drift_analysis::engine::file_index::{
    CallRecord, ErrorHandlingRecord, FileIndex, FunctionRecord, Parameter, SourceLocation,
};
use drift_analysis::scanner::Language;

fn loc(line: u32) -> SourceLocation {
    SourceLocation { line, column: 0, end_line: line + 2, end_column: 0 }
}

/// Write `file_count` small Python source files under `root`, each
/// defining `funcs_per_file` top-level functions that call into the next
/// file's first function — enough surface for the scanner to walk, hash,
/// and classify without needing a real project checked out.
pub fn write_synthetic_repo(root: &Path, file_count: usize, funcs_per_file: usize) {
    for i in 0..file_count {
        let mut src = String::new();
        src.push_str("import logging\n\nlogger = logging.getLogger(__name__)\n\n");
        for f in 0..funcs_per_file {
            src.push_str(&format!(
                "def fn_{i}_{f}(x, y):\n    try:\n        logger.info(\"fn_{i}_{f} called\")\n        return fn_{next_i}_0(x, y)\n    except ValueError:\n        return None\n\n",
                i = i,
                f = f,
                next_i = (i + 1) % file_count,
            ));
        }
        std::fs::write(root.join(format!("module_{i}.py")), src).expect("write fixture file");
    }
}

/// Build `file_count` `FileIndex`es in memory, each with `funcs_per_file`
/// functions, a call from each function to the first function of the next
/// file (so the call graph has real cross-file edges to resolve), and one
/// error-handling record per function (so the pattern engine has
/// detections to aggregate).
pub fn synthetic_file_indexes(file_count: usize, funcs_per_file: usize) -> Vec<(String, FileIndex)> {
    let mut out = Vec::with_capacity(file_count);
    for i in 0..file_count {
        let file_path = format!("module_{i}.py");
        let mut index = FileIndex::empty(file_path.clone(), Language::Python, [i as u8; 8]);

        for f in 0..funcs_per_file {
            let qualified_name = format!("module_{i}.fn_{i}_{f}");
            let callee = format!("module_{}.fn_{}_0", (i + 1) % file_count, (i + 1) % file_count);

            index.functions.push(FunctionRecord {
                qualified_name: qualified_name.clone(),
                name: format!("fn_{i}_{f}"),
                parameters: vec![
                    Parameter { name: "x".to_string(), type_annotation: None, default_value: None },
                    Parameter { name: "y".to_string(), type_annotation: None, default_value: None },
                ],
                return_type: None,
                decorators: Vec::new(),
                is_exported: true,
                is_async: false,
                is_entry_point: false,
                location: loc((f * 6) as u32 + 1),
                signature_hash: [0; 8],
                body_hash: [f as u8; 8],
                doc_comment: None,
                enclosing_class: None,
            });

            index.calls.push(CallRecord {
                receiver: None,
                callee_text: callee,
                argument_count: 2,
                location: loc((f * 6) as u32 + 3),
                enclosing_function: Some(qualified_name.clone()),
            });

            index.error_handling.push(ErrorHandlingRecord {
                caught_types: vec!["ValueError".to_string()],
                location: loc((f * 6) as u32 + 5),
            });
        }

        out.push((file_path, index));
    }
    out
}
