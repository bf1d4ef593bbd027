//! Terminal rendering of service answers.

use alma_models::{
    Badge, EarAnalysis, PhysicalDimensions, Recommendation, RecommendationResponse, TierRating,
    format_confidence, format_idr, format_mm,
};
use colored::{ColoredString, Colorize};

/// How many fit matches the ear summary lists
const FIT_PREVIEW: usize = 3;

pub fn tier_badge(tier: TierRating) -> ColoredString {
    let label = format!("[{}]", tier.label());
    match tier.badge() {
        Badge::Error => label.red().bold(),
        Badge::Warning => label.yellow().bold(),
        Badge::Success => label.green().bold(),
        Badge::Info => label.blue().bold(),
    }
}

pub fn print_response(response: &RecommendationResponse) {
    println!(
        "{} {}",
        "Recommendations".bold().blue(),
        format!(
            "(confidence {})",
            format_confidence(response.confidence_score)
        )
        .dimmed()
    );

    match response.visual_analysis() {
        Some(analysis) => {
            println!("{} Based on your ear photo", "✓".green());
            print_ear_analysis(analysis);
        }
        None if response.has_visual_proof => {
            println!("{} Visual proof flagged but no ear analysis came back", "!".yellow());
        }
        None => {}
    }

    if response.recommendations.is_empty() {
        println!("{}", "No products matched.".yellow());
    }
    for rec in &response.recommendations {
        print_recommendation(rec);
    }

    println!();
    println!("{} {}", "Why:".bold(), response.reasoning);
    if !response.sources.is_empty() {
        println!("{} {}", "Sources:".bold(), response.sources.join(", "));
    }
}

fn print_recommendation(rec: &Recommendation) {
    println!();
    println!(
        "{} {}  {}  {}",
        format!("#{}", rec.rank).green(),
        rec.display_name().bold(),
        format_idr(rec.price).cyan(),
        tier_badge(rec.tier_rating)
    );
    println!("   {}", rec.why_recommended);

    if !rec.key_features.is_empty() {
        println!("   {} {}", "Features:".dimmed(), rec.key_features.join(", "));
    }
    for pro in &rec.pros {
        println!("   {} {}", "+".green(), pro);
    }
    for con in &rec.cons {
        println!("   {} {}", "-".red(), con);
    }
    for (marketplace, url) in rec.purchase_links.iter() {
        println!("   {} {}", format!("{}:", marketplace.name()).dimmed(), url);
    }
}

pub fn print_ear_analysis(analysis: &EarAnalysis) {
    let m = &analysis.measurements;
    println!("{}", "Ear analysis".bold().blue());
    println!(
        "{}Ear canal: {} ({} ear, {} confidence)",
        "• ".cyan(),
        format_mm(m.ear_canal_diameter_mm),
        m.size_category,
        m.confidence
    );
    println!(
        "{}Concha: {} wide, {} deep",
        "• ".cyan(),
        format_mm(m.concha_width_mm),
        format_mm(m.concha_depth_mm)
    );
    println!(
        "{}Ear: {} x {}",
        "• ".cyan(),
        format_mm(m.overall_ear_height_mm),
        format_mm(m.overall_ear_width_mm)
    );
    if let Some(notes) = m.notes() {
        println!("{}{}", "• ".cyan(), notes);
    }

    let fits = analysis.best_fits();
    if !fits.is_empty() {
        println!("{}", "Best physical fit:".bold());
    }
    for fit in fits.into_iter().take(FIT_PREVIEW) {
        let canal = match fit.physical_dimensions.fits_canal(m.ear_canal_diameter_mm) {
            Some(true) => " fits your canal".green().to_string(),
            Some(false) => " outside your canal size".yellow().to_string(),
            None => String::new(),
        };
        let kind = match &fit.physical_dimensions {
            PhysicalDimensions::Earbud(_) => "earbud",
            PhysicalDimensions::Headphone(_) => "headphone",
        };
        println!(
            "  - {} {} {} ({:.0}/100, {}, {:.1}g){}",
            fit.brand,
            fit.model,
            tier_badge(fit.tier_rating),
            fit.fit_score,
            kind,
            fit.physical_dimensions.weight_grams(),
            canal
        );
        println!("    {}", fit.fit_reason.dimmed());
    }
    println!(
        "{}",
        format!("Analysis confidence: {}", analysis.analysis_confidence).dimmed()
    );
}
