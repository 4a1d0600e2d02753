use upgrade_report::{aggregate, parse, parse_with_report};

const EXPORT: &str = "\u{feff}Período;Cliente;Vendedor;Processo;Plano Novo;Diferença\r\n\
2024-03;Mercado Sol;Ana;PR-1001;Fibra 500;R$ 1.250,00\r\n\
2024-03;\"Padaria; Pão Quente\";Bruno;PR-1002;Fibra 300;89,90\r\n\
2024-03;Oficina Leste;Ana;PR-1003;Fibra 500;-\r\n\
2024-03;Loja Norte;Carla;PR-1004;Fibra 1G;2.100,50\r\n\
\r\n\
;;;;;\r\n\
2024-03;Clínica Vida;Bruno;PR-1005;Fibra 300;NaN\r\n\
2024-03;Escola Alfa;Davi;PR-1006;Fibra 300;40.5\r\n";

#[test]
fn example_from_two_lines() {
    let text = "h1;h2;h3;h4;h5;h6\n;Alice;Bob;P1;Gold;1.234,56\n;Carol;Dan;P2;Silver;-\n";
    let records = parse(text);
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].vendor.as_str(), records[0].diff), ("Bob", 1234.56));
    assert_eq!((records[1].vendor.as_str(), records[1].diff), ("Dan", 0.0));
    let stats = aggregate(&records);
    assert_eq!(stats.total_value, 1234.56);
    assert_eq!(stats.best_seller.name, "Bob");
    assert_eq!(stats.best_seller.value, 1234.56);
}

#[test]
fn realistic_export() {
    let (records, report) = parse_with_report(EXPORT);
    assert_eq!(records.len(), 6);
    assert_eq!(report.blank_lines, 2);
    assert_eq!(report.empty_rows, 1);
    assert!(records.windows(2).all(|w| w[0].diff >= w[1].diff));
    assert!(records.iter().all(|r| r.diff.is_finite()));
    assert_eq!(records[0].vendor, "Carla");
    assert_eq!(records[0].diff, 2100.5);
    assert!(records.iter().any(|r| r.client == "Padaria; Pão Quente"));

    let stats = aggregate(&records);
    assert_eq!(stats.total_records, 6);
    assert_eq!(stats.total_value, records.iter().map(|r| r.diff).sum::<f64>());
    assert_eq!(stats.best_seller.name, "Carla");

    let top: Vec<&str> = stats.top3_vendors.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(top, vec!["Carla", "Ana", "Bruno"]);
    assert_eq!(stats.top3_vendors[0].percentage, 100.0);
    assert_eq!(stats.vendor_data.get("Ana"), Some(1250.0));
    assert_eq!(stats.plan_data.get("Fibra 300"), Some(3));

    let plans: Vec<&str> = stats.plan_data.iter().map(|(p, _)| p).collect();
    assert_eq!(plans, vec!["Fibra 1G", "Fibra 500", "Fibra 300"]);
}

#[test]
fn reparsing_is_identical() {
    assert_eq!(parse(EXPORT), parse(EXPORT));
    assert_eq!(aggregate(&parse(EXPORT)), aggregate(&parse(EXPORT)));
}
