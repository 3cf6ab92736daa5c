//! Python sources written next to the candidates.
//!
//! Arguments travel on the command line as Python literals and are `eval`ed
//! on the other side. `inf` and `nan` are imported so that float reprs of
//! non-finite values evaluate.

/// Candidate-side wrapper: imports one candidate module, calls the function
/// and prints whether the result equals the cached expected result.
///
/// argv: case index, candidate file name, function name, argument literals.
pub const WRAPPER_FILE: &str = "wrapper.py";

/// Cached reference results, one Python literal per case.
pub const EXPECTED_FILE: &str = "expected.py";

/// Reference-side runner: loads the reference by path and prints the repr
/// of its result.
///
/// argv: reference path, function name, argument literals.
pub const RUNNER_FILE: &str = "runner.py";

/// File names the tester owns inside the candidate directory.
pub const GENERATED_FILES: [&str; 3] = [WRAPPER_FILE, EXPECTED_FILE, RUNNER_FILE];

pub const WRAPPER_SOURCE: &str = r#"import sys

sys.dont_write_bytecode = True

from importlib import import_module
from math import inf, nan
from expected import results


def test_candidate(case_num, impl_name, fname, args):
    mod = import_module(impl_name[:-3])
    func = getattr(mod, fname)
    actual = func(*args)
    return actual == results[case_num]


if __name__ == "__main__":
    case_num = int(sys.argv[1])
    impl_name = sys.argv[2]
    fname = sys.argv[3]
    args = [eval(arg) for arg in sys.argv[4:]]
    print(test_candidate(case_num, impl_name, fname, args))
"#;

pub const RUNNER_SOURCE: &str = r#"import sys
import importlib.util
from math import inf, nan

sys.dont_write_bytecode = True


def load(path):
    spec = importlib.util.spec_from_file_location("reference_solution", path)
    module = importlib.util.module_from_spec(spec)
    spec.loader.exec_module(module)
    return module


if __name__ == "__main__":
    func = getattr(load(sys.argv[1]), sys.argv[2])
    args = [eval(arg) for arg in sys.argv[3:]]
    print(repr(func(*args)))
"#;

/// Contents of `expected.py` for the given result literals.
pub fn expected_source(results: &[String]) -> String {
    format!(
        "from math import inf, nan\n\nresults = [{}]\n",
        results.join(", ")
    )
}
