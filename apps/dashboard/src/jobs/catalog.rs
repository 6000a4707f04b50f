//! Built-in job postings. Static and read-only.

use super::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct JobPosting {
    pub id: u32,
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub category: Category,
    pub salary: Option<&'static str>,
    pub description: &'static str,
    pub responsibilities: &'static [&'static str],
    pub requirements: &'static [&'static str],
    pub benefits: &'static [&'static str],
    pub required_skills: &'static [&'static str],
}

pub fn postings() -> &'static [JobPosting] {
    &CATALOG
}

pub fn find(id: u32) -> Option<&'static JobPosting> {
    postings().iter().find(|p| p.id == id)
}

pub fn in_category(category: Category) -> impl Iterator<Item = &'static JobPosting> {
    postings().iter().filter(move |p| p.category == category)
}

static CATALOG: [JobPosting; 10] = [
    JobPosting {
        id: 1,
        title: "Software Engineer Intern",
        company: "TechCorp",
        location: "New Delhi, India",
        category: Category::OnCampus,
        salary: Some("₹12-15 LPA"),
        description: "Join our dynamic engineering team to build scalable software solutions. You will work closely with senior engineers to design, develop, and deploy high-quality code.",
        responsibilities: &[
            "Collaborate with cross-functional teams to define, design, and ship new features.",
            "Write clean, maintainable, and efficient code.",
            "Participate in code reviews and technical discussions.",
            "Troubleshoot and debug applications.",
        ],
        requirements: &[
            "Pursuing B.Tech in CS/IT or related field.",
            "Strong proficiency in Python or Java.",
            "Solid understanding of Data Structures and Algorithms.",
            "Familiarity with RESTful APIs and Git.",
        ],
        benefits: &["Health Insurance", "Flexible Work Hours", "Free Meals", "Learning Allowance"],
        required_skills: &["Python", "React", "DSA", "JavaScript"],
    },
    JobPosting {
        id: 2,
        title: "Data Analyst",
        company: "DataInsights Inc.",
        location: "Gurgaon, India",
        category: Category::OnCampus,
        salary: Some("₹8-10 LPA"),
        description: "We are looking for a passionate Data Analyst to turn data into information, information into insight, and insight into business decisions.",
        responsibilities: &[
            "Interpret data, analyze results using statistical techniques and provide ongoing reports.",
            "Develop and implement databases, data collection systems, data analytics and other strategies that optimize statistical efficiency and quality.",
            "Acquire data from primary or secondary data sources and maintain databases/data systems.",
        ],
        requirements: &[
            "Strong knowledge of and experience with reporting packages (Business Objects etc), databases (SQL etc), programming (XML, Javascript, or ETL frameworks).",
            "Knowledge of statistics and experience using statistical packages for analyzing datasets (Excel, SPSS, SAS etc).",
            "Strong analytical skills with the ability to collect, organize, analyze, and disseminate significant amounts of information with attention to detail and accuracy.",
        ],
        benefits: &["Performance Bonus", "Health Insurance", "Team Outings"],
        required_skills: &["Python", "SQL", "Tableau", "Statistics"],
    },
    JobPosting {
        id: 3,
        title: "Frontend Developer",
        company: "WebSolutions",
        location: "Mumbai, India",
        category: Category::OnCampus,
        salary: Some("₹10-12 LPA"),
        description: "We are seeking a Frontend Developer to join our creative team. You will be responsible for building the 'client-side' of our web applications.",
        responsibilities: &[
            "Use markup languages like HTML to create user-friendly web pages.",
            "Maintain and improve website.",
            "Optimize applications for maximum speed.",
            "Design mobile-based features.",
        ],
        requirements: &[
            "Proven work experience as a Front-end developer.",
            "Hands on experience with markup languages.",
            "Experience with JavaScript, CSS and jQuery.",
            "Familiarity with browser testing and debugging.",
        ],
        benefits: &["Remote Work Options", "Stock Options", "Gym Membership"],
        required_skills: &["JavaScript", "React", "CSS", "HTML", "Vue.js"],
    },
    JobPosting {
        id: 4,
        title: "QA Engineer",
        company: "QualityFirst Ltd.",
        location: "Pune, India",
        category: Category::OnCampus,
        salary: Some("₹6-8 LPA"),
        description: "We are looking for a QA Engineer to assess software quality through manual and automated testing.",
        responsibilities: &[
            "Review requirements, specifications and technical design documents to provide timely and meaningful feedback.",
            "Create detailed, comprehensive and well-structured test plans and test cases.",
            "Estimate, prioritize, plan and coordinate testing activities.",
        ],
        requirements: &[
            "Proven work experience in software development.",
            "Proven work experience in software quality assurance.",
            "Strong knowledge of software QA methodologies, tools and processes.",
            "Experience in writing clear, concise and comprehensive test plans and test cases.",
        ],
        benefits: &["Health Insurance", "Paid Time Off", "Certification Support"],
        required_skills: &["Manual Testing", "Automation Testing", "Selenium", "JIRA"],
    },
    JobPosting {
        id: 5,
        title: "DevOps Associate",
        company: "CloudBridge",
        location: "Hyderabad, India",
        category: Category::OnCampus,
        salary: Some("₹14-18 LPA"),
        description: "Join our DevOps team to help us build functional systems that improve customer experience.",
        responsibilities: &[
            "Deploy updates and fixes.",
            "Provide technical support Level 2.",
            "Build tools to reduce occurrences of errors and improve customer experience.",
            "Develop software to integrate with internal back-end systems.",
        ],
        requirements: &[
            "Work experience as a DevOps Engineer or similar software engineering role.",
            "Good knowledge of Ruby or Python.",
            "Working knowledge of databases and SQL.",
            "Problem-solving attitude.",
        ],
        benefits: &["Relocation Assistance", "Stock Options", "Free Snacks"],
        required_skills: &["Linux", "Docker", "CI/CD", "AWS Basics"],
    },
    JobPosting {
        id: 6,
        title: "Backend Developer",
        company: "CloudStartups",
        location: "Bangalore, India",
        category: Category::OffCampus,
        salary: Some("₹18-25 LPA"),
        description: "We are looking for an experienced Backend Developer to join our core team. You will be responsible for the server-side logic and integration of the front-end elements.",
        responsibilities: &[
            "Integration of user-facing elements developed by a front-end developers with server side logic.",
            "Building reusable code and libraries for future use.",
            "Optimization of the application for maximum speed and scalability.",
            "Implementation of security and data protection.",
        ],
        requirements: &[
            "Basic understanding of front-end technologies and platforms, such as JavaScript, HTML5, and CSS3.",
            "Good understanding of server-side CSS preprocessors, such as LESS and SASS.",
            "User authentication and authorization between multiple systems, servers, and environments.",
            "Integration of multiple data sources and databases into one system.",
        ],
        benefits: &["Competitive Salary", "Equity", "Remote First"],
        required_skills: &["Node.js", "AWS", "SQL", "REST APIs", "MongoDB"],
    },
    JobPosting {
        id: 7,
        title: "Machine Learning Engineer",
        company: "AIFrontiers",
        location: "Chennai, India",
        category: Category::OffCampus,
        salary: Some("₹20-30 LPA"),
        description: "We are looking for a Machine Learning Engineer to help us build the next generation of AI-powered products.",
        responsibilities: &[
            "Designing and developing machine learning and deep learning systems.",
            "Running machine learning tests and experiments.",
            "Implementing appropriate ML algorithms.",
            "Study and transform data science prototypes.",
        ],
        requirements: &[
            "Proven experience as a Machine Learning Engineer or similar role.",
            "Understanding of data structures, data modeling and software architecture.",
            "Deep knowledge of math, probability, statistics and algorithms.",
            "Ability to write robust code in Python, Java and R.",
        ],
        benefits: &["Top-tier Health Insurance", "Conference Budget", "Latest Hardware"],
        required_skills: &["Python", "ML", "TensorFlow", "PyTorch", "Scikit-learn"],
    },
    JobPosting {
        id: 8,
        title: "Full Stack Developer",
        company: "AppVenture",
        location: "Remote",
        category: Category::OffCampus,
        salary: Some("₹15-22 LPA"),
        description: "We are looking for a Full Stack Developer to produce scalable software solutions. You’ll be part of a cross-functional team that’s responsible for the full software development life cycle, from conception to deployment.",
        responsibilities: &[
            "Work with development teams and product managers to ideate software solutions.",
            "Design client-side and server-side architecture.",
            "Build the front-end of applications through appealing visual design.",
            "Develop and manage well-functioning databases and applications.",
        ],
        requirements: &[
            "Proven experience as a Full Stack Developer or similar role.",
            "Experience developing desktop and mobile applications.",
            "Familiarity with common stacks.",
            "Knowledge of multiple front-end languages and libraries (e.g. HTML/ CSS, JavaScript, XML, jQuery).",
        ],
        benefits: &["Unlimited PTO", "Home Office Stipend", "Wellness Budget"],
        required_skills: &["JavaScript", "React", "Node.js", "Express", "PostgreSQL", "Docker"],
    },
    JobPosting {
        id: 9,
        title: "Cybersecurity Specialist",
        company: "SecureNet",
        location: "Kolkata, India",
        category: Category::OffCampus,
        salary: Some("₹12-18 LPA"),
        description: "We are looking for a Cybersecurity Specialist to monitor our computer networks and systems for threats and security breaches.",
        responsibilities: &[
            "Monitor computer networks for security issues.",
            "Investigate security breaches and other cybersecurity incidents.",
            "Install security measures and operate software to protect systems and information infrastructure, including firewalls and data encryption programs.",
            "Document security breaches and assess the damage they cause.",
        ],
        requirements: &[
            "Proven work experience as a Cybersecurity Specialist or similar role.",
            "Experience with firewalls, Internet VPN’s remote implementation, troubleshooting, and problem resolution is desired.",
            "Ability to handle proprietary and sensitive information in a confidential manner.",
            "Hands-on experience in security systems, including firewalls, intrusion detection systems, anti-virus software, authentication systems, log management, content filtering, etc.",
        ],
        benefits: &["Certification Reimbursement", "Secure Work Environment", "Health Benefits"],
        required_skills: &[
            "Network Security",
            "Ethical Hacking",
            "SIEM Tools",
            "Incident Response",
        ],
    },
    JobPosting {
        id: 10,
        title: "Mobile App Developer",
        company: "MobileMasters",
        location: "Jaipur, India",
        category: Category::OffCampus,
        salary: Some("₹10-15 LPA"),
        description: "We are looking for a Mobile App Developer to design and build the next generation of our mobile applications.",
        responsibilities: &[
            "Support the entire application lifecycle (concept, design, test, release and support).",
            "Produce fully functional mobile applications writing clean code.",
            "Gather specific requirements and suggest solutions.",
            "Write unit and UI tests to identify malfunctions.",
        ],
        requirements: &[
            "Proven work experience as a Mobile developer.",
            "Demonstrable portfolio of released applications on the App store or the Android market.",
            "In-depth knowledge of at least one programming language like Swift and Java.",
            "Experience with third-party libraries and APIs.",
        ],
        benefits: &["Flexible Schedule", "Device Lab Access", "Annual Retreat"],
        required_skills: &["Flutter", "Dart", "Firebase", "iOS", "Android"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique_and_split_evenly() {
        let mut ids: Vec<u32> = postings().iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert_eq!(in_category(Category::OnCampus).count(), 5);
        assert_eq!(in_category(Category::OffCampus).count(), 5);
    }

    #[test]
    fn test_find() {
        assert_eq!(find(7).map(|p| p.company), Some("AIFrontiers"));
        assert!(find(42).is_none());
    }
}
