//! End-to-end tests: source text through compilation and both engines.

mod common;

use approx::assert_relative_eq;
use common::*;
use kuri::domain::context::Context;
use kuri::domain::diagnostic::DiagnosticCode;
use kuri::domain::engine::{Engine, StrategyEngine, VisualEngine};
use kuri::domain::error::{KuriError, LimitKind, RuntimeError};
use kuri::domain::ir::{ConstValue, IrNode, IrProgram};
use kuri::domain::limits::RuntimeLimits;
use kuri::domain::pipeline;
use kuri::domain::side_channel::{Direction, PlotStyle, StrategyEvent};
use kuri::domain::signal::{latest_signals, RiskDefaults, SignalAction};
use kuri::domain::templates;
use kuri::domain::value::Value;
use std::time::Duration;

fn series<'a>(ctx: &'a Context, name: &str) -> &'a [Option<f64>] {
    match ctx.get(name) {
        Some(Value::Series(s)) => s,
        other => panic!("expected series binding '{}', got {:?}", name, other),
    }
}

fn bools<'a>(ctx: &'a Context, name: &str) -> &'a [bool] {
    match ctx.get(name) {
        Some(Value::BoolSeries(s)) => s,
        other => panic!("expected bool series binding '{}', got {:?}", name, other),
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn sma_over_rising_closes() {
        let mut ctx = rising_context(20);
        pipeline::run(&VisualEngine::default(), "x = sma(close, 5)", &mut ctx).unwrap();

        let x = series(&ctx, "x");
        assert_eq!(x.len(), 20);
        assert!(x[..4].iter().all(Option::is_none));
        assert_relative_eq!(x[4].unwrap(), 12.0);
        assert_relative_eq!(x[19].unwrap(), 27.0);
    }

    #[test]
    fn constant_expression_folds_to_single_node() {
        let compilation = pipeline::compile("val = 5 + 5").unwrap();
        assert_eq!(
            compilation.program.statements,
            vec![IrNode::Assign {
                name: "val".into(),
                value: Box::new(IrNode::constant(ConstValue::Number(10.0))),
            }]
        );

        let mut ctx = rising_context(3);
        VisualEngine::default()
            .run(&compilation.program, &mut ctx)
            .unwrap();
        assert_eq!(ctx.get("val"), Some(&Value::Scalar(10.0)));
    }

    #[test]
    fn forbidden_keyword_is_rejected() {
        let diagnostics = pipeline::check("for = 1");
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_code(DiagnosticCode::ForbiddenKeyword));

        match pipeline::compile("for = 1") {
            Err(KuriError::Semantic(d)) => assert!(d.has_code(DiagnosticCode::ForbiddenKeyword)),
            other => panic!("expected semantic failure, got {:?}", other),
        }
    }

    #[test]
    fn series_division_by_zero_is_absent() {
        let mut ctx = rising_context(5);
        pipeline::run(&VisualEngine::default(), "x = close / 0", &mut ctx).unwrap();
        let x = series(&ctx, "x");
        assert_eq!(x.len(), 5);
        assert!(x.iter().all(Option::is_none));
    }

    #[test]
    fn ema_crossover_fires_once_after_the_turn() {
        let mut ctx = Context::from_bars(&bars_from_closes(&v_shaped_closes()));
        let src = "fast = ema(close, 3)\nslow = ema(close, 8)\nup = crossover(fast, slow)\ndown = crossunder(fast, slow)";
        pipeline::run(&VisualEngine::default(), src, &mut ctx).unwrap();

        let up = bools(&ctx, "up");
        assert_eq!(up.len(), 20);
        let fired: Vec<usize> = up.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i).collect();
        assert_eq!(fired.len(), 1, "crossings at {:?}", fired);
        assert!(fired[0] > 10);
        assert!(bools(&ctx, "down").iter().all(|b| !b));
    }

    #[test]
    fn reserved_series_cannot_be_reassigned() {
        let diagnostics = pipeline::check("close = 1");
        assert!(diagnostics.has_code(DiagnosticCode::BuiltinReassignment));
        assert!(matches!(pipeline::compile("close = 1"), Err(KuriError::Semantic(_))));
    }
}

mod engines {
    use super::*;

    const SCRIPT: &str = r#"
fast = ema(close, 3)
slow = ema(close, 8)
plot(fast, "Fast")
plotshape(crossover(fast, slow), "Cross")
strategy.entry("long", "long", crossover(fast, slow), 1.5)
strategy.close("long", crossunder(fast, slow))
"#;

    fn context() -> Context {
        Context::from_bars(&bars_from_closes(&v_shaped_closes()))
    }

    #[test]
    fn both_engines_produce_identical_bindings() {
        let program = pipeline::compile(SCRIPT).unwrap().program;
        let mut visual_ctx = context();
        let mut strategy_ctx = context();

        let visual = VisualEngine::default().run(&program, &mut visual_ctx).unwrap();
        let strategy = StrategyEngine::default().run(&program, &mut strategy_ctx).unwrap();

        assert_eq!(visual_ctx, strategy_ctx);
        assert_eq!(visual.stats.operations, strategy.stats.operations);
    }

    #[test]
    fn visual_engine_keeps_plots_only() {
        let mut ctx = context();
        let out = pipeline::run(&VisualEngine::default(), SCRIPT, &mut ctx).unwrap();

        assert_eq!(out.plots.len(), 2);
        assert_eq!(out.plots[0].title, "Fast");
        assert_eq!(out.plots[0].style, PlotStyle::Line);
        assert_eq!(out.plots[1].style, PlotStyle::Shape);
    }

    #[test]
    fn strategy_engine_keeps_events_only() {
        let mut ctx = context();
        let out = pipeline::run(&StrategyEngine::default(), SCRIPT, &mut ctx).unwrap();

        assert_eq!(out.events.len(), 2);
        match &out.events[0] {
            StrategyEvent::Entry(entry) => {
                assert_eq!(entry.id, "long");
                assert_eq!(entry.direction, Direction::Long);
                assert_eq!(entry.stop_loss_pct, Some(1.5));
                assert_eq!(entry.take_profit_pct, None);
                assert_eq!(entry.condition.len(), 20);
            }
            other => panic!("expected entry, got {:?}", other),
        }
        assert!(matches!(&out.events[1], StrategyEvent::Close(c) if c.id == "long"));
    }

    #[test]
    fn runs_are_deterministic() {
        let program = pipeline::compile(SCRIPT).unwrap().program;
        let mut first_ctx = context();
        let mut second_ctx = context();
        let first = StrategyEngine::default().run(&program, &mut first_ctx).unwrap();
        let second = StrategyEngine::default().run(&program, &mut second_ctx).unwrap();

        assert_eq!(first.events, second.events);
        assert_eq!(first_ctx, second_ctx);
    }

    #[test]
    fn ir_document_survives_json_transport() {
        let program = pipeline::compile(SCRIPT).unwrap().program;
        let restored = IrProgram::from_json(&program.to_json().unwrap()).unwrap();
        assert_eq!(restored, program);

        let mut direct = context();
        let mut transported = context();
        VisualEngine::default().run(&program, &mut direct).unwrap();
        VisualEngine::default().run(&restored, &mut transported).unwrap();
        assert_eq!(direct, transported);
    }
}

mod sandbox {
    use super::*;

    #[test]
    fn operation_budget_stops_the_run() {
        let limits = RuntimeLimits {
            max_operations: 5,
            ..RuntimeLimits::default()
        };
        let mut ctx = rising_context(10);
        let err = pipeline::run(
            &VisualEngine::new(limits),
            "a = sma(close, 2)\nb = sma(close, 3)\nc = a + b",
            &mut ctx,
        )
        .unwrap_err();

        match err {
            KuriError::Runtime(RuntimeError::LimitExceeded(v)) => {
                assert_eq!(v.kind, LimitKind::Operations);
                assert_eq!(v.limit, 5);
            }
            other => panic!("expected operation limit, got {:?}", other),
        }
    }

    #[test]
    fn oversized_input_is_rejected_before_running() {
        let limits = RuntimeLimits {
            max_series_length: 10,
            ..RuntimeLimits::default()
        };
        let mut ctx = rising_context(11);
        let err = pipeline::run(&StrategyEngine::new(limits), "x = close", &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            KuriError::Runtime(RuntimeError::LimitExceeded(v)) if v.kind == LimitKind::SeriesLength
        ));
        assert!(ctx.get("x").is_none());
    }

    #[test]
    fn limit_violation_maps_to_sandbox_exit_code() {
        let limits = RuntimeLimits {
            max_operations: 1,
            ..RuntimeLimits::default()
        };
        let mut ctx = rising_context(3);
        let err = pipeline::run(&VisualEngine::new(limits), "x = close + 1", &mut ctx).unwrap_err();
        assert_eq!(err.exit_status(), 6);
    }

    #[test]
    fn time_budget_stops_after_the_running_statement() {
        let limits = RuntimeLimits {
            max_execution_time: Duration::ZERO,
            ..RuntimeLimits::default()
        };
        let mut ctx = rising_context(500);
        let err = pipeline::run(
            &StrategyEngine::new(limits),
            "a = sma(close, 50)\nb = close + 1",
            &mut ctx,
        )
        .unwrap_err();

        match &err {
            KuriError::Runtime(runtime) => {
                assert!(runtime.is_sandbox_violation());
                assert!(matches!(
                    runtime,
                    RuntimeError::LimitExceeded(v) if v.kind == LimitKind::ExecutionTime
                ));
            }
            other => panic!("expected time limit, got {:?}", other),
        }
        assert!(ctx.get("a").is_some());
        assert!(ctx.get("b").is_none());
    }

    #[test]
    fn hostile_nesting_is_a_parse_diagnostic() {
        let sources = [
            format!("x = {}1{}", "(".repeat(5_000), ")".repeat(5_000)),
            format!("x = {}1", "-".repeat(20_000)),
            format!("x = close{}", " + close".repeat(50_000)),
        ];
        for source in &sources {
            let diagnostics = pipeline::check(source);
            assert_eq!(diagnostics.len(), 1);
            assert!(diagnostics.has_code(DiagnosticCode::NestingTooDeep));
            assert!(matches!(pipeline::compile(source), Err(KuriError::Parse(_))));
        }
    }
}

mod template_runs {
    use super::*;

    #[test]
    fn every_template_runs_on_both_engines() {
        for template in templates::all() {
            let mut ctx = rising_context(40);
            pipeline::run(&VisualEngine::default(), template.source, &mut ctx)
                .unwrap_or_else(|e| panic!("{} (visual): {}", template.id, e));
            let mut ctx = rising_context(40);
            pipeline::run(&StrategyEngine::default(), template.source, &mut ctx)
                .unwrap_or_else(|e| panic!("{} (strategy): {}", template.id, e));
        }
    }

    #[test]
    fn ma_crossover_signals_on_the_crossing_bar() {
        let template = templates::find("ma-crossover").unwrap();
        // A steady decline keeps EMA 9 under EMA 21 until the final bar jumps.
        let mut closes: Vec<f64> = (0..30).map(|i| 130.0 - i as f64).collect();
        closes.push(200.0);
        let mut ctx = Context::from_bars(&bars_from_closes(&closes));
        let out = pipeline::run(&StrategyEngine::default(), template.source, &mut ctx).unwrap();

        let close = ctx.series("close").unwrap().clone();
        let signals = latest_signals(&out.events, &close, &RiskDefaults::default());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].id, "ma-long");
        assert_eq!(signals[0].action, SignalAction::Entry);
        assert_relative_eq!(signals[0].price, 200.0);
        let risk = signals[0].risk.unwrap();
        assert_relative_eq!(risk.stop_loss, 196.0, epsilon = 1e-9);
        assert_relative_eq!(risk.take_profit, 208.0, epsilon = 1e-9);
    }
}
